//! Fish species classification responses
//!
//! Two shapes are in the wild:
//!
//! ```text
//! flat:   { "species" | "predicted_class", "confidence", "top_predictions"? }
//! nested: { "classification": { "species", "confidence", "top_predictions" },
//!           "biological_data": { "biological_info", "data_source" } }
//! ```
//!
//! The presence of a `classification` object selects the nested decoder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::confidence::{format_confidence, percent_value, Severity};
use super::{number, prose, reject_backend_error, text};
use crate::error::{Error, Result};

/// One ranked label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

/// Canonical classification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub species: String,
    /// Always percent text, e.g. `"87.50%"`
    pub confidence: String,
    /// Best first
    #[serde(default)]
    pub top_predictions: Vec<Prediction>,
    #[serde(default)]
    pub biological_notes: String,
    #[serde(default)]
    pub data_source: Option<String>,
}

impl ClassificationResult {
    /// Confidence as a number, when the text holds one
    pub fn confidence_value(&self) -> Option<f64> {
        percent_value(&self.confidence)
    }

    pub fn severity(&self) -> Severity {
        Severity::from_confidence(self.confidence_value().unwrap_or(0.0))
    }
}

enum FishShape<'a> {
    Flat(&'a Map<String, Value>),
    Nested {
        classification: &'a Map<String, Value>,
        biological: Option<&'a Map<String, Value>>,
    },
}

fn detect(body: &Value) -> Result<FishShape<'_>> {
    let obj = body
        .as_object()
        .ok_or_else(|| Error::SchemaMismatch("classification body is not an object".into()))?;
    match obj.get("classification").and_then(Value::as_object) {
        Some(classification) => Ok(FishShape::Nested {
            classification,
            biological: obj.get("biological_data").and_then(Value::as_object),
        }),
        None => Ok(FishShape::Flat(obj)),
    }
}

/// Reduce either classification shape to [`ClassificationResult`].
///
/// A body without any species label is an error: the caller's fallback chain
/// treats it like a failed endpoint.
pub fn normalize_classification(body: &Value) -> Result<ClassificationResult> {
    reject_backend_error(body)?;
    match detect(body)? {
        FishShape::Flat(obj) => decode_flat(obj),
        FishShape::Nested {
            classification,
            biological,
        } => decode_nested(classification, biological),
    }
}

fn label(obj: &Map<String, Value>) -> Result<String> {
    text(obj.get("species"))
        .or_else(|| text(obj.get("predicted_class")))
        .ok_or_else(|| Error::SchemaMismatch("no species label in classification".into()))
}

fn decode_flat(obj: &Map<String, Value>) -> Result<ClassificationResult> {
    Ok(ClassificationResult {
        species: label(obj)?,
        confidence: format_confidence(obj.get("confidence").unwrap_or(&Value::Null)),
        top_predictions: top_predictions(obj.get("top_predictions")),
        biological_notes: prose(obj.get("biological_info")),
        data_source: text(obj.get("data_source")),
    })
}

fn decode_nested(
    classification: &Map<String, Value>,
    biological: Option<&Map<String, Value>>,
) -> Result<ClassificationResult> {
    Ok(ClassificationResult {
        species: label(classification)?,
        confidence: format_confidence(classification.get("confidence").unwrap_or(&Value::Null)),
        top_predictions: top_predictions(classification.get("top_predictions")),
        biological_notes: prose(biological.and_then(|b| b.get("biological_info"))),
        data_source: text(biological.and_then(|b| b.get("data_source"))),
    })
}

/// Accepts `{label: score}`, `[[label, score]]` or `[{label|species, score|confidence}]`
fn top_predictions(value: Option<&Value>) -> Vec<Prediction> {
    match value {
        Some(Value::Object(map)) => {
            let mut predictions: Vec<Prediction> = map
                .iter()
                .filter_map(|(label, score)| {
                    number(score).map(|score| Prediction {
                        label: label.clone(),
                        score,
                    })
                })
                .collect();
            predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
            predictions
        }
        Some(Value::Array(items)) => items.iter().filter_map(prediction_entry).collect(),
        _ => Vec::new(),
    }
}

fn prediction_entry(item: &Value) -> Option<Prediction> {
    match item {
        Value::Array(pair) if pair.len() == 2 => Some(Prediction {
            label: pair[0].as_str()?.to_string(),
            score: number(&pair[1])?,
        }),
        Value::Object(obj) => {
            let label = text(obj.get("label"))
                .or_else(|| text(obj.get("species")))
                .or_else(|| text(obj.get("class")))?;
            let score = ["score", "confidence", "probability"]
                .iter()
                .find_map(|key| obj.get(*key).and_then(number))?;
            Some(Prediction { label, score })
        }
        _ => None,
    }
}
