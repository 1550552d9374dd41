//! Response normalizers
//!
//! The backend has shipped several response shapes for the same feature and
//! never sends a version field. Each normalizer detects the shape by which
//! keys are present, decodes it with a per-variant function, and converges on
//! one canonical record for rendering.
//!
//! Shapes that match no known variant are read as the legacy variant on a
//! best-effort basis. Only an explicit `error` field in the body is turned
//! into an [`Error::Backend`](crate::error::Error::Backend).

pub mod chat;
pub mod confidence;
pub mod edna;
pub mod fish;
pub mod ocean;
pub mod overfishing;

pub use chat::{normalize_chat_reply, ChatMessage, ChatRole, ChatTranscript};
pub use confidence::{format_confidence, Severity};
pub use edna::{
    invasive_alert, normalize_edna, DetectedSpecies, EdnaAnalysis, EdnaSummary, SpeciesProfile,
};
pub use fish::{normalize_classification, ClassificationResult, Prediction};
pub use ocean::{
    normalize_chlorophyll, normalize_sst, normalize_upload_hint, ChlorophyllPrediction,
    ForecastPoint, SstForecast,
};
pub use overfishing::{
    normalize_overfishing, AgentInsights, OverfishingAnalysis, OverfishingSummary, RiskLevel,
    Series,
};

use serde_json::Value;

use crate::error::{Error, Result};

/// Fail with the backend's own message when the body carries an `error` field
pub(crate) fn reject_backend_error(body: &Value) -> Result<()> {
    match body.get("error") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(msg)) => Err(Error::Backend(msg.clone())),
        Some(other) => Err(Error::Backend(other.to_string())),
    }
}

/// Number, or a string holding one
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric array; non-numeric entries are dropped
pub(crate) fn number_series(value: Option<&Value>) -> Vec<f64> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(number).collect())
        .unwrap_or_default()
}

/// Numeric array that keeps positions; non-numeric entries become `None`
pub(crate) fn number_slots(value: Option<&Value>) -> Vec<Option<f64>> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().map(number).collect())
        .unwrap_or_default()
}

/// Non-empty string
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Free text from a string, list of strings, or object
pub(crate) fn prose(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{}: {}", key, s),
                other => format!("{}: {}", key, other),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
