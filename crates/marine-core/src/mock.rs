//! Deterministic synthetic results
//!
//! Used as the last resort of a fallback chain and by the mock backend.
//! Every generator is seeded from the SHA-256 of the uploaded bytes, so the
//! same file always yields the same result.

use chrono::{Datelike, Months, NaiveDate};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::normalize::{
    AgentInsights, ChlorophyllPrediction, ClassificationResult, DetectedSpecies, EdnaAnalysis,
    ForecastPoint, OverfishingAnalysis, OverfishingSummary, Prediction, Series, SpeciesProfile,
    SstForecast,
};

/// `data_source` marker on synthetic classifications
pub const MOCK_SOURCE: &str = "mock";

/// Common Indian Ocean catch, with a one-line note each
const FISH_CATALOGUE: &[(&str, &str)] = &[
    ("Indian Mackerel", "Schooling plankton feeder of coastal shelf waters."),
    ("Oil Sardine", "Filter feeder forming dense coastal shoals during the monsoon."),
    ("Yellowfin Tuna", "Highly migratory pelagic predator of warm offshore waters."),
    ("Silver Pomfret", "Bottom-associated species of muddy coastal waters."),
    ("Hilsa Shad", "Anadromous herring that migrates upriver to spawn."),
    ("Red Snapper", "Reef-associated carnivore found over rocky bottoms."),
    ("Seer Fish", "Fast predatory mackerel of coastal and offshore waters."),
    ("Bombay Duck", "Soft-bodied lizardfish of turbid estuarine waters."),
];

/// Sequences in the synthetic eDNA sample; the lionfish is always flagged
const EDNA_SAMPLE: &[(&str, &str, bool)] = &[
    ("Thunnus albacares", "ATGGCAAGCCTACGAAAAACACACCCACTACTAAAAATT", false),
    ("Rastrelliger kanagurta", "ATGGCTAGCCTCCGAAAATCCCACCCACTTCTAAAAATC", false),
    ("Pterois volitans", "GTGGCCAGCCTACGAAAAACCCATCCCCTACTAAAAATC", true),
    ("Sardinella longiceps", "ATGGCAAGTCTGCGTAAAACCCACCCCCTTCTAAAAATT", false),
];

/// Byte stream derived from a SHA-256 digest
struct Seed {
    digest: [u8; 32],
    pos: usize,
}

impl Seed {
    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            digest: Sha256::digest(bytes).into(),
            pos: 0,
        }
    }

    fn next_u16(&mut self) -> u16 {
        let hi = self.digest[self.pos % 32];
        let lo = self.digest[(self.pos + 1) % 32];
        self.pos += 2;
        u16::from_be_bytes([hi, lo])
    }

    fn index(&mut self, len: usize) -> usize {
        self.next_u16() as usize % len.max(1)
    }

    /// Value in `[lo, hi]` with two decimals
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = self.next_u16() as f64 / u16::MAX as f64;
        round2(lo + unit * (hi - lo))
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Synthetic fish classification for an image
pub fn mock_classification(image: &[u8]) -> ClassificationResult {
    let mut seed = Seed::from_bytes(image);
    let first = seed.index(FISH_CATALOGUE.len());
    let confidence = seed.range(70.0, 98.0);

    let runner_up = (first + 1 + seed.index(FISH_CATALOGUE.len() - 1)) % FISH_CATALOGUE.len();
    let mut third = (runner_up + 1) % FISH_CATALOGUE.len();
    if third == first {
        third = (third + 1) % FISH_CATALOGUE.len();
    }
    let remaining = 100.0 - confidence;
    let second_score = round2(remaining * 0.7);
    let third_score = round2(remaining - second_score);

    let (species, notes) = FISH_CATALOGUE[first];
    ClassificationResult {
        species: species.to_string(),
        confidence: format!("{:.2}%", confidence),
        top_predictions: vec![
            Prediction {
                label: species.to_string(),
                score: confidence,
            },
            Prediction {
                label: FISH_CATALOGUE[runner_up].0.to_string(),
                score: second_score,
            },
            Prediction {
                label: FISH_CATALOGUE[third].0.to_string(),
                score: third_score,
            },
        ],
        biological_notes: notes.to_string(),
        data_source: Some(MOCK_SOURCE.to_string()),
    }
}

/// Synthetic eDNA result; always contains one invasive detection
pub fn mock_edna(sequence_file: &[u8]) -> EdnaAnalysis {
    let mut seed = Seed::from_bytes(sequence_file);
    let detected_species = EDNA_SAMPLE
        .iter()
        .enumerate()
        .map(|(i, (species, sequence, invasive))| DetectedSpecies {
            sequence: sequence.to_string(),
            species: species.to_string(),
            confidence: Some(seed.range(72.0, 99.0)),
            invasive: *invasive,
            sequence_id: Some(format!("SEQ_{:04}", i + 1)),
        })
        .collect();
    EdnaAnalysis {
        detected_species,
        analysis: None,
        invasive_species: Vec::new(),
    }
}

/// Synthetic species profile, for the mock backend's chat context
pub fn mock_species_profile(species: &str) -> SpeciesProfile {
    SpeciesProfile {
        species_scientific: species.to_string(),
        confidence: Some(90.0),
        genetic_markers: vec!["COI".to_string(), "12S rRNA".to_string()],
        invasive_status: "Unknown".to_string(),
        ..Default::default()
    }
}

/// Synthetic twelve-month stock and catch series with a 20% threshold
pub fn mock_overfishing(csv: &[u8]) -> OverfishingAnalysis {
    let mut seed = Seed::from_bytes(csv);
    let months: Vec<String> = (1..=12).map(|m| format!("2024-{:02}", m)).collect();
    let mut stock = Vec::with_capacity(12);
    let mut catch = Vec::with_capacity(12);
    let mut level = seed.range(9_000.0, 12_000.0);
    for _ in 0..12 {
        level = round2(level * seed.range(0.95, 1.02));
        stock.push(level);
        catch.push(round2(level * seed.range(0.12, 0.28)));
    }
    let threshold: Vec<Option<f64>> = stock.iter().map(|s| Some(round2(s * 0.2))).collect();
    let stock: Vec<Option<f64>> = stock.into_iter().map(Some).collect();
    let catch: Vec<Option<f64>> = catch.into_iter().map(Some).collect();

    let summary = OverfishingSummary::from_series(&stock, &catch, &threshold);
    let is_overfishing = summary.current_catch > summary.current_threshold;
    let series = vec![
        Series {
            name: "Stock Volume".into(),
            x: months.clone(),
            y: stock,
        },
        Series {
            name: "Catch Volume".into(),
            x: months.clone(),
            y: catch,
        },
        Series {
            name: "Threshold (20%)".into(),
            x: months,
            y: threshold,
        },
    ];
    OverfishingAnalysis {
        series,
        layout: json!({"title": "Stock vs Catch Volume", "xaxis": {"title": "Month"}}),
        insights: Some(AgentInsights {
            is_overfishing,
            catch_volume: Some(summary.current_catch),
            threshold: Some(summary.current_threshold),
            catch_percentage: (summary.current_stock > 0.0)
                .then(|| round2(summary.current_catch * 100.0 / summary.current_stock)),
            rag_text: String::new(),
            recommendations: Vec::new(),
        }),
    }
}

/// Synthetic chlorophyll predictions for a handful of depths
pub fn mock_chlorophyll(csv: &[u8]) -> ChlorophyllPrediction {
    let mut seed = Seed::from_bytes(csv);
    let depth: Vec<f64> = vec![5.0, 10.0, 20.0, 40.0, 80.0];
    let salinity = depth.iter().map(|_| seed.range(34.5, 35.8)).collect();
    let ph = depth.iter().map(|_| seed.range(7.9, 8.2)).collect();
    // Chlorophyll falls off with depth
    let predicted_chlorophyll = depth
        .iter()
        .map(|d| round2(seed.range(0.8, 1.6) / (1.0 + d / 20.0)))
        .collect();
    ChlorophyllPrediction {
        depth,
        salinity,
        ph,
        predicted_chlorophyll,
        actual_chlorophyll: None,
    }
}

/// Synthetic twelve-step monthly SST forecast
pub fn mock_sst(csv: &[u8]) -> SstForecast {
    let mut seed = Seed::from_bytes(csv);
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    let base = seed.range(26.0, 29.0);
    let forecast = (0..12u32)
        .filter_map(|step| start.checked_add_months(Months::new(step)))
        .map(|date| {
            // Warmest around May, coolest around January
            let phase = (date.month0() as f64 - 4.0) / 12.0 * std::f64::consts::TAU;
            let yhat = round2(base + 1.5 * phase.cos());
            let spread = seed.range(0.3, 0.8);
            ForecastPoint {
                ds: date.format("%Y-%m-%d").to_string(),
                yhat,
                yhat_lower: round2(yhat - spread),
                yhat_upper: round2(yhat + spread),
            }
        })
        .collect();
    SstForecast { forecast }
}

/// Canned assistant reply for the mock backend
pub fn mock_chat_reply(question: &str) -> String {
    format!(
        "(offline) No assistant is connected. Your question was: {}",
        question.trim()
    )
}
