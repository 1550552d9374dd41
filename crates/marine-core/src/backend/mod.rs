//! Marine analytics backend abstraction
//!
//! # Architecture
//!
//! - `MarineBackend` trait: every feature action the dashboard can perform
//! - `MarineClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Implementations: `HttpBackend` (the real service) and `MockBackend`
//!   (fully synthetic, no network)
//!
//! Fish classification and eDNA analysis never fail: they run a fallback
//! chain ending in a synthetic result. The other actions return errors for
//! the caller to surface.

mod http;
mod mock;

pub use http::HttpBackend;
pub use mock::MockBackend;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::fallback::Fallback;
use crate::normalize::{
    ChlorophyllPrediction, ClassificationResult, EdnaAnalysis, OverfishingAnalysis,
    SpeciesProfile, SstForecast,
};
use crate::upload::FilePayload;

/// Backend routes other than the configurable fish chain
pub mod endpoints {
    pub const CHLOROPHYLL_CSV: &str = "/predict/csv";
    pub const SST_CSV: &str = "/predict/sst/csv";
    pub const SST_HINT: &str = "/predict/sst";
    pub const OVERFISHING: &str = "/overfishing_monitor";
    pub const EDNA_ANALYZE: &str = "/api/v1/edna/analyze";
    pub const EDNA_CHAT: &str = "/api/v1/edna/chat";
    pub const FISHERIES_AGENT: &str = "/aws/fisheries-agent";
}

#[async_trait]
pub trait MarineBackend: Send + Sync {
    /// Classify a fish image; falls back to a synthetic result
    async fn classify_fish(&self, image: &FilePayload) -> Fallback<ClassificationResult>;

    /// Stock vs catch analysis of a catch CSV
    async fn analyze_overfishing(&self, csv: &FilePayload) -> Result<OverfishingAnalysis>;

    /// Chlorophyll prediction from a depth/salinity/pH CSV
    async fn predict_chlorophyll(&self, csv: &FilePayload) -> Result<ChlorophyllPrediction>;

    /// Sea surface temperature forecast from a date/value CSV
    async fn forecast_sst(&self, csv: &FilePayload) -> Result<SstForecast>;

    /// Upload instructions for the SST forecaster
    async fn sst_upload_hint(&self) -> Result<String>;

    /// eDNA sequence analysis; falls back to the synthetic sample
    async fn analyze_edna(&self, sequences: &FilePayload) -> Fallback<EdnaAnalysis>;

    /// Ask about an analysed species
    async fn ask_species(&self, profile: &SpeciesProfile, question: &str) -> Result<String>;

    /// Ask the fisheries knowledge assistant
    async fn ask_fisheries_agent(&self, query: &str) -> Result<String>;

    /// Human-readable target, for logs and `marine config`
    fn describe(&self) -> String;
}

/// Concrete backend client
#[derive(Clone)]
pub enum MarineClient {
    Http(HttpBackend),
    Mock(MockBackend),
}

impl MarineClient {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(MarineClient::Http(HttpBackend::new(config)?))
    }

    pub fn mock() -> Self {
        MarineClient::Mock(MockBackend::new())
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, MarineClient::Mock(_))
    }
}

#[async_trait]
impl MarineBackend for MarineClient {
    async fn classify_fish(&self, image: &FilePayload) -> Fallback<ClassificationResult> {
        match self {
            MarineClient::Http(b) => b.classify_fish(image).await,
            MarineClient::Mock(b) => b.classify_fish(image).await,
        }
    }

    async fn analyze_overfishing(&self, csv: &FilePayload) -> Result<OverfishingAnalysis> {
        match self {
            MarineClient::Http(b) => b.analyze_overfishing(csv).await,
            MarineClient::Mock(b) => b.analyze_overfishing(csv).await,
        }
    }

    async fn predict_chlorophyll(&self, csv: &FilePayload) -> Result<ChlorophyllPrediction> {
        match self {
            MarineClient::Http(b) => b.predict_chlorophyll(csv).await,
            MarineClient::Mock(b) => b.predict_chlorophyll(csv).await,
        }
    }

    async fn forecast_sst(&self, csv: &FilePayload) -> Result<SstForecast> {
        match self {
            MarineClient::Http(b) => b.forecast_sst(csv).await,
            MarineClient::Mock(b) => b.forecast_sst(csv).await,
        }
    }

    async fn sst_upload_hint(&self) -> Result<String> {
        match self {
            MarineClient::Http(b) => b.sst_upload_hint().await,
            MarineClient::Mock(b) => b.sst_upload_hint().await,
        }
    }

    async fn analyze_edna(&self, sequences: &FilePayload) -> Fallback<EdnaAnalysis> {
        match self {
            MarineClient::Http(b) => b.analyze_edna(sequences).await,
            MarineClient::Mock(b) => b.analyze_edna(sequences).await,
        }
    }

    async fn ask_species(&self, profile: &SpeciesProfile, question: &str) -> Result<String> {
        match self {
            MarineClient::Http(b) => b.ask_species(profile, question).await,
            MarineClient::Mock(b) => b.ask_species(profile, question).await,
        }
    }

    async fn ask_fisheries_agent(&self, query: &str) -> Result<String> {
        match self {
            MarineClient::Http(b) => b.ask_fisheries_agent(query).await,
            MarineClient::Mock(b) => b.ask_fisheries_agent(query).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            MarineClient::Http(b) => b.describe(),
            MarineClient::Mock(b) => b.describe(),
        }
    }
}
