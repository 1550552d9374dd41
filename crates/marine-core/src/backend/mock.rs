//! Mock backend for demos and tests
//!
//! Never touches the network. Results come from the deterministic generators
//! in [`crate::mock`], so the same file always produces the same answer.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::fallback::Fallback;
use crate::mock::{
    mock_chat_reply, mock_chlorophyll, mock_classification, mock_edna, mock_overfishing,
    mock_sst, mock_species_profile,
};
use crate::normalize::{
    ChlorophyllPrediction, ClassificationResult, EdnaAnalysis, OverfishingAnalysis,
    SpeciesProfile, SstForecast,
};
use crate::upload::FilePayload;

use super::MarineBackend;

const SOURCE: &str = "mock";

/// Fully synthetic backend
#[derive(Clone, Default)]
pub struct MockBackend {
    /// When false every fallible action fails with a transport-like error
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create a mock backend whose fallible actions all fail
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }

    fn check(&self) -> Result<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(Error::Backend("mock backend is unhealthy".into()))
        }
    }
}

#[async_trait]
impl MarineBackend for MockBackend {
    async fn classify_fish(&self, image: &FilePayload) -> Fallback<ClassificationResult> {
        Fallback::direct(SOURCE, mock_classification(&image.bytes))
    }

    async fn analyze_overfishing(&self, csv: &FilePayload) -> Result<OverfishingAnalysis> {
        self.check()?;
        Ok(mock_overfishing(&csv.bytes))
    }

    async fn predict_chlorophyll(&self, csv: &FilePayload) -> Result<ChlorophyllPrediction> {
        self.check()?;
        Ok(mock_chlorophyll(&csv.bytes))
    }

    async fn forecast_sst(&self, csv: &FilePayload) -> Result<SstForecast> {
        self.check()?;
        Ok(mock_sst(&csv.bytes))
    }

    async fn sst_upload_hint(&self) -> Result<String> {
        self.check()?;
        Ok("Upload SST CSV to /predict/sst/csv with columns: date,value".to_string())
    }

    async fn analyze_edna(&self, sequences: &FilePayload) -> Fallback<EdnaAnalysis> {
        let mut analysis = mock_edna(&sequences.bytes);
        // Give the sample a profile so species chat works offline
        if let Some(first) = analysis.detected_species.first() {
            analysis.analysis = Some(mock_species_profile(&first.species));
        }
        Fallback::direct(SOURCE, analysis)
    }

    async fn ask_species(&self, _profile: &SpeciesProfile, question: &str) -> Result<String> {
        self.check()?;
        Ok(mock_chat_reply(question))
    }

    async fn ask_fisheries_agent(&self, query: &str) -> Result<String> {
        self.check()?;
        Ok(mock_chat_reply(query))
    }

    fn describe(&self) -> String {
        if self.healthy {
            "mock".to_string()
        } else {
            "mock (unhealthy)".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_edna_has_profile_and_alert() {
        let backend = MockBackend::new();
        let file = FilePayload::new("sample.fasta", b">s1\nACGT\n".to_vec());
        let result = backend.analyze_edna(&file).await;
        assert!(!result.is_synthetic());
        assert_eq!(result.value.alert(), Some("Pterois volitans"));
        assert!(result.value.analysis.is_some());
    }

    #[tokio::test]
    async fn test_unhealthy_fails_but_classification_succeeds() {
        let backend = MockBackend::unhealthy();
        let csv = FilePayload::new("sst.csv", b"date,value\n".to_vec());
        assert!(backend.forecast_sst(&csv).await.is_err());
        assert!(backend.ask_fisheries_agent("quota?").await.is_err());

        let image = FilePayload::new("fish.png", vec![1, 2, 3]);
        let result = backend.classify_fish(&image).await;
        assert!(!result.value.species.is_empty());
        assert_eq!(backend.describe(), "mock (unhealthy)");
    }
}
