//! eDNA analysis responses
//!
//! The analyze endpoint returns per-sequence detections plus an optional
//! profile of the dominant species. Older deployments send the profile
//! alone; it is folded into a single detection so callers always get a list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::confidence::Severity;
use super::{number, prose, reject_backend_error, text};
use crate::error::{Error, Result};

/// Characters of a raw sequence shown when no sequence id is known
const SEQUENCE_PREVIEW: usize = 16;

/// One sequence matched to a species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedSpecies {
    #[serde(default)]
    pub sequence: String,
    pub species: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub invasive: bool,
    #[serde(default, alias = "sequenceId")]
    pub sequence_id: Option<String>,
}

impl DetectedSpecies {
    /// Sequence id, or the start of the raw sequence
    pub fn display_id(&self) -> String {
        match self.sequence_id.as_deref().filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let preview: String = self.sequence.chars().take(SEQUENCE_PREVIEW).collect();
                format!("{}...", preview)
            }
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_confidence(self.confidence.unwrap_or(0.0))
    }
}

/// Detailed profile of the dominant species; also the context sent with chat questions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    #[serde(default)]
    pub species_scientific: String,
    #[serde(default)]
    pub species_common: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub genetic_markers: Vec<String>,
    #[serde(default)]
    pub invasive_status: String,
    #[serde(default)]
    pub characteristics: Map<String, Value>,
    #[serde(default)]
    pub ecological_role: String,
    #[serde(default)]
    pub interesting_facts: Vec<String>,
    /// Fields this client does not know about, sent back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SpeciesProfile {
    /// Best available display name
    pub fn name(&self) -> &str {
        if !self.species_common.is_empty() {
            &self.species_common
        } else {
            &self.species_scientific
        }
    }

    pub fn is_invasive(&self) -> bool {
        let status = self.invasive_status.to_ascii_lowercase();
        status.contains("invasive") && !status.contains("not") && !status.contains("non")
    }
}

/// Canonical eDNA result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdnaAnalysis {
    pub detected_species: Vec<DetectedSpecies>,
    #[serde(default)]
    pub analysis: Option<SpeciesProfile>,
    /// Names the backend flagged explicitly
    #[serde(default)]
    pub invasive_species: Vec<String>,
}

impl EdnaAnalysis {
    /// Species to raise an alert for, if any
    pub fn alert(&self) -> Option<&str> {
        self.invasive_species
            .first()
            .map(String::as_str)
            .or_else(|| invasive_alert(&self.detected_species))
    }

    pub fn summary(&self) -> EdnaSummary {
        let total = self.detected_species.len();
        let mean_confidence = if total == 0 {
            0
        } else {
            let sum: f64 = self
                .detected_species
                .iter()
                .map(|s| s.confidence.unwrap_or(0.0))
                .sum();
            (sum / total as f64 + 0.5).floor() as i64
        };
        EdnaSummary {
            total,
            mean_confidence,
            invasive: self.detected_species.iter().filter(|s| s.invasive).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdnaSummary {
    pub total: usize,
    /// Rounded percent
    pub mean_confidence: i64,
    pub invasive: usize,
}

/// Name of the first flagged species; `None` when nothing is flagged
pub fn invasive_alert(detections: &[DetectedSpecies]) -> Option<&str> {
    detections
        .iter()
        .find(|d| d.invasive)
        .map(|d| d.species.as_str())
}

/// Decode an `/api/v1/edna/analyze` body
pub fn normalize_edna(body: &Value) -> Result<EdnaAnalysis> {
    reject_backend_error(body)?;
    let obj = body
        .as_object()
        .ok_or_else(|| Error::SchemaMismatch("eDNA body is not an object".into()))?;

    let analysis = obj
        .get("analysis")
        .and_then(Value::as_object)
        .map(decode_profile);

    let detected_species = match obj.get("detected_species").and_then(Value::as_array) {
        Some(items) => items.iter().filter_map(detection).collect(),
        None => match &analysis {
            Some(profile) if !profile.name().is_empty() => vec![DetectedSpecies {
                sequence: String::new(),
                species: profile.name().to_string(),
                confidence: profile.confidence,
                invasive: profile.is_invasive(),
                sequence_id: None,
            }],
            _ => {
                return Err(Error::SchemaMismatch(
                    "eDNA body has neither detections nor a profile".into(),
                ))
            }
        },
    };

    let invasive_species = obj
        .get("invasive_species")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(entry) => text(entry.get("species")),
                    other => text(Some(other)),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(EdnaAnalysis {
        detected_species,
        analysis,
        invasive_species,
    })
}

/// Known profile keys; everything else is kept in `extra`
const PROFILE_FIELDS: [&str; 8] = [
    "species_scientific",
    "species_common",
    "confidence",
    "genetic_markers",
    "invasive_status",
    "characteristics",
    "ecological_role",
    "interesting_facts",
];

/// Field by field, so one mistyped field never costs the detections
fn decode_profile(obj: &Map<String, Value>) -> SpeciesProfile {
    SpeciesProfile {
        species_scientific: text(obj.get("species_scientific")).unwrap_or_default(),
        species_common: text(obj.get("species_common")).unwrap_or_default(),
        confidence: obj.get("confidence").and_then(number),
        genetic_markers: string_list(obj.get("genetic_markers")),
        invasive_status: prose(obj.get("invasive_status")),
        characteristics: obj
            .get("characteristics")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
        ecological_role: prose(obj.get("ecological_role")),
        interesting_facts: string_list(obj.get("interesting_facts")),
        extra: obj
            .iter()
            .filter(|(key, _)| !PROFILE_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }
}

/// A list of strings, or a single string as a one-item list
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|item| text(Some(item))).collect(),
        Some(Value::String(_)) => text(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn detection(item: &Value) -> Option<DetectedSpecies> {
    let obj = item.as_object()?;
    Some(DetectedSpecies {
        sequence: obj
            .get("sequence")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        species: text(obj.get("species"))?,
        confidence: obj.get("confidence").and_then(number),
        invasive: obj.get("invasive").and_then(Value::as_bool).unwrap_or(false),
        sequence_id: text(obj.get("sequenceId")).or_else(|| text(obj.get("sequence_id"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detected(species: &str, invasive: bool) -> DetectedSpecies {
        DetectedSpecies {
            sequence: "ATCGATCGATCGATCGATCG".into(),
            species: species.into(),
            confidence: Some(90.0),
            invasive,
            sequence_id: None,
        }
    }

    #[test]
    fn test_invasive_alert() {
        let detections = vec![
            detected("Lutjanus campechanus", false),
            detected("Pterois volitans", true),
            detected("Carcinus maenas", true),
        ];
        assert_eq!(invasive_alert(&detections), Some("Pterois volitans"));
        assert_eq!(invasive_alert(&detections[..1]), None);
        assert_eq!(invasive_alert(&[]), None);
    }

    #[test]
    fn test_mistyped_profile_fields_keep_detections() {
        let body = json!({
            "detected_species": [
                {"sequence": "ATGGCAAGCC", "species": "Thunnus albacares", "confidence": 94.2}
            ],
            "analysis": {
                "species_common": "Yellowfin Tuna",
                "ecological_role": null,
                "genetic_markers": "COI",
                "interesting_facts": [1, "Can reach 75 km/h"],
                "characteristics": "fast",
                "habitat": "Epipelagic"
            }
        });
        let analysis = normalize_edna(&body).unwrap();
        assert_eq!(analysis.detected_species.len(), 1);

        let profile = analysis.analysis.unwrap();
        assert_eq!(profile.name(), "Yellowfin Tuna");
        assert_eq!(profile.ecological_role, "");
        assert_eq!(profile.genetic_markers, vec!["COI"]);
        assert_eq!(profile.interesting_facts, vec!["Can reach 75 km/h"]);
        assert!(profile.characteristics.is_empty());
        assert_eq!(profile.extra.get("habitat"), Some(&json!("Epipelagic")));
    }

    #[test]
    fn test_display_id() {
        let mut d = detected("Thunnus albacares", false);
        assert_eq!(d.display_id(), "ATCGATCGATCGATCG...");
        d.sequence_id = Some("SEQ_0007".into());
        assert_eq!(d.display_id(), "SEQ_0007");
    }

    #[test]
    fn test_full_body() {
        let body = json!({
            "success": true,
            "detected_species": [
                {"sequence": "ATCGGCTA", "species": "Thunnus albacares", "confidence": 94.2, "sequenceId": "SEQ_001"},
                {"sequence": "GGCTTACA", "species": "Pterois volitans", "confidence": 81, "invasive": true},
                {"sequence": "TTAG"}
            ],
            "analysis": {
                "species_scientific": "Thunnus albacares",
                "species_common": "Yellowfin Tuna",
                "confidence": 94.2,
                "genetic_markers": ["COI", "16S rRNA"],
                "invasive_status": "Native",
                "characteristics": {"habitat": "Pelagic"},
                "ecological_role": "Apex predator",
                "interesting_facts": ["Can reach 75 km/h"],
                "iucn_code": "LC"
            },
            "invasive_species": [{"species": "Pterois volitans"}]
        });
        let analysis = normalize_edna(&body).unwrap();
        assert_eq!(analysis.detected_species.len(), 2);
        assert_eq!(
            analysis.detected_species[0].sequence_id.as_deref(),
            Some("SEQ_001")
        );
        assert_eq!(analysis.alert(), Some("Pterois volitans"));
        let profile = analysis.analysis.as_ref().unwrap();
        assert_eq!(profile.name(), "Yellowfin Tuna");
        assert_eq!(profile.extra.get("iucn_code"), Some(&json!("LC")));
        assert!(!profile.is_invasive());
    }

    #[test]
    fn test_profile_only_body() {
        let body = json!({
            "analysis": {
                "species_scientific": "Pterois volitans",
                "confidence": 88,
                "invasive_status": "Invasive in the Atlantic"
            }
        });
        let analysis = normalize_edna(&body).unwrap();
        assert_eq!(analysis.detected_species.len(), 1);
        assert_eq!(analysis.detected_species[0].species, "Pterois volitans");
        assert!(analysis.detected_species[0].invasive);
        assert_eq!(analysis.alert(), Some("Pterois volitans"));
    }

    #[test]
    fn test_string_invasive_list() {
        let body = json!({
            "detected_species": [{"sequence": "A", "species": "Carcinus maenas"}],
            "invasive_species": ["Carcinus maenas"]
        });
        let analysis = normalize_edna(&body).unwrap();
        assert_eq!(analysis.invasive_species, vec!["Carcinus maenas".to_string()]);
        assert_eq!(analysis.alert(), Some("Carcinus maenas"));
    }

    #[test]
    fn test_no_alert_when_nothing_flagged() {
        let body = json!({"detected_species": [{"sequence": "A", "species": "Sardinella longiceps"}]});
        assert_eq!(normalize_edna(&body).unwrap().alert(), None);
    }

    #[test]
    fn test_empty_body_is_schema_mismatch() {
        assert!(matches!(
            normalize_edna(&json!({"success": false})).unwrap_err(),
            Error::SchemaMismatch(_)
        ));
    }

    #[test]
    fn test_summary() {
        let analysis = EdnaAnalysis {
            detected_species: vec![
                DetectedSpecies {
                    confidence: Some(90.0),
                    ..detected("a", false)
                },
                DetectedSpecies {
                    confidence: Some(81.0),
                    ..detected("b", true)
                },
                DetectedSpecies {
                    confidence: None,
                    ..detected("c", false)
                },
            ],
            ..Default::default()
        };
        let summary = analysis.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.mean_confidence, 57);
        assert_eq!(summary.invasive, 1);
    }

    #[test]
    fn test_profile_round_trips_unknown_fields() {
        let raw = json!({"species_common": "Lionfish", "venomous": true});
        let profile: SpeciesProfile = serde_json::from_value(raw).unwrap();
        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["venomous"], json!(true));
        assert_eq!(back["species_common"], json!("Lionfish"));
    }
}
