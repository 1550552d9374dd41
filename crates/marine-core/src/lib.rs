//! Marine Insights Core Library
//!
//! Client side of the Marine Insights analytics dashboard:
//! - URL building with a configurable base prefix
//! - Thin JSON / multipart HTTP client
//! - Response normalizers that reconcile the backend's schema variants
//! - Ordered fallback chains with deterministic mock results
//! - Backend abstraction (HTTP or fully synthetic)
//! - Per-page feature controllers with busy flags and error banners

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod fallback;
pub mod http;
pub mod mock;
pub mod normalize;
pub mod upload;
pub mod url;

/// Test utilities including mock marine backend server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use backend::{endpoints, HttpBackend, MarineBackend, MarineClient, MockBackend};
pub use config::{ClientConfig, FishEndpoints, API_BASE_ENV};
pub use controller::{
    Banner, BiodiversityController, BusyFlag, ChatController, Dispatch, FisheriesController,
    OceanController,
};
pub use error::{Error, Result};
pub use fallback::{Fallback, FallbackChain, ResultSource};
pub use http::{ApiClient, RequestBody, RequestSpec};
pub use normalize::{
    format_confidence, invasive_alert, ChatMessage, ChatRole, ChatTranscript,
    ChlorophyllPrediction, ClassificationResult, DetectedSpecies, EdnaAnalysis, ForecastPoint,
    OverfishingAnalysis, OverfishingSummary, Prediction, RiskLevel, Severity, SpeciesProfile,
    SstForecast,
};
pub use upload::{check_upload, FilePayload, UploadCheck, UploadKind};
pub use url::{QueryParams, QueryValue, ResolvedUrl, UrlBuilder};
