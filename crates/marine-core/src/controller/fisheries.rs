//! Fisheries page: fish classification and overfishing monitoring
//!
//! Both actions share one busy flag, so an image classification and a catch
//! upload never run at the same time.

use std::sync::Mutex;

use serde::Serialize;
use tracing::debug;

use crate::backend::{MarineBackend, MarineClient};
use crate::error::{Error, Result};
use crate::fallback::{Fallback, ResultSource};
use crate::normalize::{ClassificationResult, OverfishingAnalysis};
use crate::upload::FilePayload;

use super::{lock, Banner, BusyFlag, Dispatch};

const OVERFISHING_UNREACHABLE: &str =
    "Failed to upload CSV. Please check the file format and try again.";

#[derive(Debug, Clone, Default, Serialize)]
pub struct FisheriesState {
    #[serde(skip)]
    pub image: Option<FilePayload>,
    pub classification: Option<ClassificationResult>,
    pub classification_source: Option<ResultSource>,
    #[serde(skip)]
    pub catch_csv: Option<FilePayload>,
    pub overfishing: Option<OverfishingAnalysis>,
    pub banner: Banner,
}

pub struct FisheriesController {
    client: MarineClient,
    busy: BusyFlag,
    state: Mutex<FisheriesState>,
}

impl FisheriesController {
    pub fn new(client: MarineClient) -> Self {
        Self {
            client,
            busy: BusyFlag::new(),
            state: Mutex::new(FisheriesState::default()),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn snapshot(&self) -> FisheriesState {
        lock(&self.state).clone()
    }

    pub fn dismiss_banner(&self) {
        lock(&self.state).banner.dismiss();
    }

    /// Select an image; clears the previous classification
    pub fn select_image(&self, image: FilePayload) {
        let mut state = lock(&self.state);
        state.image = Some(image);
        state.classification = None;
        state.classification_source = None;
    }

    /// Select a catch CSV; clears the previous analysis
    pub fn select_catch_csv(&self, csv: FilePayload) {
        let mut state = lock(&self.state);
        state.catch_csv = Some(csv);
        state.overfishing = None;
        state.banner.dismiss();
    }

    /// Classify the selected image. Always yields a result once dispatched.
    pub async fn classify(&self) -> Dispatch<Fallback<ClassificationResult>> {
        let Some(image) = lock(&self.state).image.clone() else {
            return Dispatch::NoInput;
        };
        let Some(_guard) = self.busy.try_acquire() else {
            debug!("Fisheries request pending, ignoring classify");
            return Dispatch::Busy;
        };

        let result = self.client.classify_fish(&image).await;

        let mut state = lock(&self.state);
        state.classification = Some(result.value.clone());
        state.classification_source = Some(result.source.clone());
        Dispatch::Completed(result)
    }

    /// Analyze the selected catch CSV; failures raise the banner
    pub async fn analyze_overfishing(&self) -> Dispatch<Result<OverfishingAnalysis>> {
        let Some(csv) = lock(&self.state).catch_csv.clone() else {
            return Dispatch::NoInput;
        };
        let Some(_guard) = self.busy.try_acquire() else {
            debug!("Fisheries request pending, ignoring overfishing upload");
            return Dispatch::Busy;
        };
        {
            let mut state = lock(&self.state);
            state.overfishing = None;
            state.banner.dismiss();
        }

        let outcome = self.client.analyze_overfishing(&csv).await;

        let mut state = lock(&self.state);
        match &outcome {
            Ok(analysis) => state.overfishing = Some(analysis.clone()),
            Err(e) => state.banner.show(upload_failure(e)),
        }
        Dispatch::Completed(outcome)
    }
}

fn upload_failure(error: &Error) -> String {
    if error.is_backend_reported() {
        format!("Upload failed: {}", error)
    } else {
        OVERFISHING_UNREACHABLE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockMarineServer, RouteBehavior};
    use serde_json::json;
    use std::time::Duration;

    fn catch_csv() -> FilePayload {
        FilePayload::new(
            "catch.csv",
            b"Date,Stock_Volume,Catch_Volume\n2024-01,1000,150\n".to_vec(),
        )
    }

    fn controller(server: &MockMarineServer) -> FisheriesController {
        FisheriesController::new(MarineClient::from_config(&server.config()).unwrap())
    }

    #[tokio::test]
    async fn test_no_input_dispatches_nothing() {
        let server = MockMarineServer::start().await;
        let controller = controller(&server);
        assert!(matches!(controller.classify().await, Dispatch::NoInput));
        assert!(matches!(
            controller.analyze_overfishing().await,
            Dispatch::NoInput
        ));
        assert_eq!(server.hits("/predict/fish_species"), 0);
        assert_eq!(server.hits("/overfishing_monitor"), 0);
    }

    #[tokio::test]
    async fn test_second_invocation_while_pending_is_ignored() {
        let server = MockMarineServer::start().await;
        server.set(
            "/overfishing_monitor",
            RouteBehavior::Delayed(Duration::from_millis(300), json!({"data": [], "layout": {}})),
        );
        let controller = controller(&server);
        controller.select_catch_csv(catch_csv());

        let (first, second) = tokio::join!(controller.analyze_overfishing(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            controller.analyze_overfishing().await
        });

        assert!(matches!(first, Dispatch::Completed(Ok(_))));
        assert!(second.is_busy());
        assert_eq!(server.hits("/overfishing_monitor"), 1);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_classify_and_overfishing_share_flag() {
        let server = MockMarineServer::start().await;
        server.set(
            "/overfishing_monitor",
            RouteBehavior::Delayed(Duration::from_millis(300), json!({"data": []})),
        );
        let controller = controller(&server);
        controller.select_catch_csv(catch_csv());
        controller.select_image(FilePayload::new("fish.jpg", vec![1, 2, 3]));

        let (_, classify) = tokio::join!(controller.analyze_overfishing(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            controller.classify().await
        });
        assert!(classify.is_busy());
        assert_eq!(server.hits("/predict/fish_species"), 0);
    }

    #[tokio::test]
    async fn test_backend_error_raises_banner() {
        let server = MockMarineServer::start().await;
        server.set(
            "/overfishing_monitor",
            RouteBehavior::Json(json!({"error": "CSV must contain Catch_Volume"})),
        );
        let controller = controller(&server);
        controller.select_catch_csv(catch_csv());

        let outcome = controller.analyze_overfishing().await.completed().unwrap();
        assert!(outcome.is_err());
        let state = controller.snapshot();
        assert_eq!(
            state.banner.message(),
            Some("Upload failed: CSV must contain Catch_Volume")
        );
        assert!(state.overfishing.is_none());

        controller.dismiss_banner();
        assert!(!controller.snapshot().banner.is_visible());
    }

    #[tokio::test]
    async fn test_transport_failure_uses_canned_banner() {
        let server = MockMarineServer::start().await;
        server.set("/overfishing_monitor", RouteBehavior::Malformed);
        let controller = controller(&server);
        controller.select_catch_csv(catch_csv());

        controller.analyze_overfishing().await;
        assert_eq!(
            controller.snapshot().banner.message(),
            Some(OVERFISHING_UNREACHABLE)
        );
    }

    #[tokio::test]
    async fn test_selecting_new_image_clears_result() {
        let server = MockMarineServer::start().await;
        let controller = controller(&server);
        controller.select_image(FilePayload::new("fish.jpg", vec![9]));
        controller.classify().await;
        assert!(controller.snapshot().classification.is_some());

        controller.select_image(FilePayload::new("other.jpg", vec![8]));
        assert!(controller.snapshot().classification.is_none());
    }
}
