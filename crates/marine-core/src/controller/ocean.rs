//! Ocean page: chlorophyll prediction and SST forecasting
//!
//! The two panels are independent: each has its own busy flag and banner.

use std::sync::Mutex;

use serde::Serialize;
use tracing::debug;

use crate::backend::{MarineBackend, MarineClient};
use crate::error::{Error, Result};
use crate::normalize::{ChlorophyllPrediction, SstForecast};
use crate::upload::FilePayload;

use super::{lock, Banner, BusyFlag, Dispatch};

const CHLOROPHYLL_UNREACHABLE: &str =
    "Failed to upload and predict. Make sure the backend is running.";
const SST_UNREACHABLE: &str = "Failed to upload and forecast. Make sure the backend is running.";

#[derive(Debug, Clone, Default, Serialize)]
pub struct OceanState {
    #[serde(skip)]
    pub chlorophyll_csv: Option<FilePayload>,
    pub chlorophyll: Option<ChlorophyllPrediction>,
    pub chlorophyll_banner: Banner,
    #[serde(skip)]
    pub sst_csv: Option<FilePayload>,
    pub sst: Option<SstForecast>,
    pub sst_banner: Banner,
    pub sst_hint: Option<String>,
}

pub struct OceanController {
    client: MarineClient,
    chlorophyll_busy: BusyFlag,
    sst_busy: BusyFlag,
    state: Mutex<OceanState>,
}

impl OceanController {
    pub fn new(client: MarineClient) -> Self {
        Self {
            client,
            chlorophyll_busy: BusyFlag::new(),
            sst_busy: BusyFlag::new(),
            state: Mutex::new(OceanState::default()),
        }
    }

    pub fn snapshot(&self) -> OceanState {
        lock(&self.state).clone()
    }

    pub fn select_chlorophyll_csv(&self, csv: FilePayload) {
        let mut state = lock(&self.state);
        state.chlorophyll_csv = Some(csv);
        state.chlorophyll = None;
        state.chlorophyll_banner.dismiss();
    }

    pub fn select_sst_csv(&self, csv: FilePayload) {
        let mut state = lock(&self.state);
        state.sst_csv = Some(csv);
        state.sst = None;
        state.sst_banner.dismiss();
    }

    pub async fn predict_chlorophyll(&self) -> Dispatch<Result<ChlorophyllPrediction>> {
        let Some(csv) = lock(&self.state).chlorophyll_csv.clone() else {
            return Dispatch::NoInput;
        };
        let Some(_guard) = self.chlorophyll_busy.try_acquire() else {
            debug!("Chlorophyll prediction pending, ignoring");
            return Dispatch::Busy;
        };
        lock(&self.state).chlorophyll_banner.dismiss();

        let outcome = self.client.predict_chlorophyll(&csv).await;

        let mut state = lock(&self.state);
        match &outcome {
            Ok(prediction) => state.chlorophyll = Some(prediction.clone()),
            Err(e) => {
                state.chlorophyll = None;
                state
                    .chlorophyll_banner
                    .show(banner_text(e, CHLOROPHYLL_UNREACHABLE));
            }
        }
        Dispatch::Completed(outcome)
    }

    pub async fn forecast_sst(&self) -> Dispatch<Result<SstForecast>> {
        let Some(csv) = lock(&self.state).sst_csv.clone() else {
            return Dispatch::NoInput;
        };
        let Some(_guard) = self.sst_busy.try_acquire() else {
            debug!("SST forecast pending, ignoring");
            return Dispatch::Busy;
        };
        lock(&self.state).sst_banner.dismiss();

        let outcome = self.client.forecast_sst(&csv).await;

        let mut state = lock(&self.state);
        match &outcome {
            Ok(forecast) => state.sst = Some(forecast.clone()),
            Err(e) => {
                state.sst = None;
                state.sst_banner.show(banner_text(e, SST_UNREACHABLE));
            }
        }
        Dispatch::Completed(outcome)
    }

    /// Fetch the SST upload instructions; shares the SST panel's flag
    pub async fn load_sst_hint(&self) -> Dispatch<Result<String>> {
        let Some(_guard) = self.sst_busy.try_acquire() else {
            return Dispatch::Busy;
        };
        let outcome = self.client.sst_upload_hint().await;
        if let Ok(hint) = &outcome {
            lock(&self.state).sst_hint = Some(hint.clone());
        }
        Dispatch::Completed(outcome)
    }
}

/// The backend's own message when it sent one, otherwise a canned line
fn banner_text(error: &Error, unreachable: &str) -> String {
    if error.is_backend_reported() {
        error.to_string()
    } else {
        unreachable.to_string()
    }
}
