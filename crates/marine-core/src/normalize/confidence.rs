//! Confidence display and severity banding

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format a confidence score as two-decimal percent text.
///
/// Numbers (0–100) are formatted; text is assumed to be formatted already
/// and passes through untouched, so the function is idempotent.
pub fn format_confidence(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{:.2}%", n.as_f64().unwrap_or(0.0)),
        Value::String(s) => s.clone(),
        _ => format!("{:.2}%", 0.0),
    }
}

/// Numeric percentage back out of a formatted confidence (`"87.50%"` → 87.5)
pub fn percent_value(formatted: &str) -> Option<f64> {
    formatted.trim().trim_end_matches('%').trim().parse().ok()
}

/// Confidence band used for colouring bars and badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// `> 85` high, `> 70` medium, anything else low
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 85.0 {
            Self::High
        } else if confidence > 70.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::High => "#2ECC71",
            Self::Medium => "#F1C40F",
            Self::Low => "#FF6B6B",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
