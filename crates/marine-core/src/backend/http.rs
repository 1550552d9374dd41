//! HTTP backend implementation
//!
//! Talks to the marine analytics service through [`ApiClient`]. Every upload
//! goes through the local pre-flight check first, which only logs.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ClientConfig, FishEndpoints};
use crate::error::Result;
use crate::fallback::{Fallback, FallbackChain};
use crate::http::ApiClient;
use crate::mock::{mock_classification, mock_edna};
use crate::normalize::{
    normalize_chat_reply, normalize_chlorophyll, normalize_classification, normalize_edna,
    normalize_overfishing, normalize_sst, normalize_upload_hint, ChlorophyllPrediction,
    ClassificationResult, EdnaAnalysis, OverfishingAnalysis, SpeciesProfile, SstForecast,
};
use crate::upload::{warn_on_suspect_upload, FilePayload, UploadKind};
use crate::url::QueryParams;

use super::{endpoints, MarineBackend};

#[derive(Serialize)]
struct SpeciesQuestion<'a> {
    species_data: &'a SpeciesProfile,
    question: &'a str,
}

#[derive(Serialize)]
struct AgentQuery<'a> {
    query: &'a str,
}

/// Backend reached over HTTP
#[derive(Clone)]
pub struct HttpBackend {
    api: ApiClient,
    fish: FishEndpoints,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config)?,
            fish: config.fish.clone(),
            base_url: config.base_url.clone(),
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    async fn classify_at(&self, endpoint: &str, image: &FilePayload) -> Result<ClassificationResult> {
        let body = self
            .api
            .post_multipart(endpoint, &QueryParams::new(), image)
            .await?;
        normalize_classification(&body)
    }

    async fn upload(&self, path: &str, kind: UploadKind, file: &FilePayload) -> Result<serde_json::Value> {
        warn_on_suspect_upload(kind, file);
        self.api
            .post_multipart(path, &QueryParams::new(), file)
            .await
    }
}

#[async_trait]
impl MarineBackend for HttpBackend {
    async fn classify_fish(&self, image: &FilePayload) -> Fallback<ClassificationResult> {
        warn_on_suspect_upload(UploadKind::FishImage, image);
        let mut chain = FallbackChain::new();
        for endpoint in self.fish.ordered() {
            chain = chain.attempt(endpoint, self.classify_at(endpoint, image));
        }
        let result = chain
            .run_or_else(|| mock_classification(&image.bytes))
            .await;
        if result.is_synthetic() {
            warn!(file = %image.file_name, "No classification endpoint answered, showing mock result");
        } else {
            info!(endpoint = %result.source, species = %result.value.species, "Fish classified");
        }
        result
    }

    async fn analyze_overfishing(&self, csv: &FilePayload) -> Result<OverfishingAnalysis> {
        let body = self
            .upload(endpoints::OVERFISHING, UploadKind::OverfishingCsv, csv)
            .await?;
        normalize_overfishing(&body)
    }

    async fn predict_chlorophyll(&self, csv: &FilePayload) -> Result<ChlorophyllPrediction> {
        let body = self
            .upload(endpoints::CHLOROPHYLL_CSV, UploadKind::ChlorophyllCsv, csv)
            .await?;
        normalize_chlorophyll(&body)
    }

    async fn forecast_sst(&self, csv: &FilePayload) -> Result<SstForecast> {
        let body = self
            .upload(endpoints::SST_CSV, UploadKind::SstCsv, csv)
            .await?;
        normalize_sst(&body)
    }

    async fn sst_upload_hint(&self) -> Result<String> {
        let body = self
            .api
            .get_json(endpoints::SST_HINT, &QueryParams::new())
            .await?;
        normalize_upload_hint(&body)
    }

    async fn analyze_edna(&self, sequences: &FilePayload) -> Fallback<EdnaAnalysis> {
        let result = FallbackChain::new()
            .attempt(endpoints::EDNA_ANALYZE, async {
                let body = self
                    .upload(endpoints::EDNA_ANALYZE, UploadKind::EdnaSequence, sequences)
                    .await?;
                normalize_edna(&body)
            })
            .run_or_else(|| mock_edna(&sequences.bytes))
            .await;
        if result.is_synthetic() {
            warn!(file = %sequences.file_name, "eDNA service unavailable, showing sample result");
        }
        result
    }

    async fn ask_species(&self, profile: &SpeciesProfile, question: &str) -> Result<String> {
        let body = SpeciesQuestion {
            species_data: profile,
            question,
        };
        let reply = self
            .api
            .post_json(endpoints::EDNA_CHAT, &QueryParams::new(), Some(&body))
            .await?;
        normalize_chat_reply(&reply)
    }

    async fn ask_fisheries_agent(&self, query: &str) -> Result<String> {
        let body = AgentQuery { query };
        let reply = self
            .api
            .post_json(endpoints::FISHERIES_AGENT, &QueryParams::new(), Some(&body))
            .await?;
        normalize_chat_reply(&reply)
    }

    fn describe(&self) -> String {
        if self.base_url.is_empty() {
            format!("http ({})", self.api.origin())
        } else {
            format!("http ({}, base {})", self.api.origin(), self.base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fallback::ResultSource;
    use crate::test_utils::{MockMarineServer, RouteBehavior};
    use serde_json::json;

    fn image() -> FilePayload {
        FilePayload::new("catch.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    #[tokio::test]
    async fn test_primary_endpoint_used() {
        let server = MockMarineServer::start().await;
        let backend = HttpBackend::new(&server.config()).unwrap();

        let result = backend.classify_fish(&image()).await;
        assert_eq!(
            result.source,
            ResultSource::Endpoint("/predict/fish_species".into())
        );
        assert!(result.failures.is_empty());
        assert_eq!(server.hits("/classify/fish"), 0);
    }

    #[tokio::test]
    async fn test_alternate_used_after_status_and_missing_label() {
        let server = MockMarineServer::start().await;
        server.set("/predict/fish_species", RouteBehavior::Status(500));
        server.set(
            "/classify/fish",
            RouteBehavior::Json(json!({"confidence": 88.0})),
        );
        server.set(
            "/api/v1/fish/classify",
            RouteBehavior::Json(json!({"predicted_class": "Oil Sardine", "confidence": 77.7})),
        );
        let backend = HttpBackend::new(&server.config()).unwrap();

        let result = backend.classify_fish(&image()).await;
        assert_eq!(result.value.species, "Oil Sardine");
        assert_eq!(result.value.confidence, "77.70%");
        assert_eq!(result.failures.len(), 2);
        assert!(matches!(
            result.failures[0].error,
            Error::HttpStatus { status: 500, .. }
        ));
        assert!(matches!(result.failures[1].error, Error::SchemaMismatch(_)));
    }

    #[tokio::test]
    async fn test_multipart_field_name() {
        let server = MockMarineServer::start().await;
        let backend = HttpBackend::new(&server.config()).unwrap();
        backend.classify_fish(&image()).await;

        let body = server.last_body("/predict/fish_species").unwrap();
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains(r#"name="file""#));
        assert!(body.contains(r#"filename="catch.jpg""#));
    }

    #[tokio::test]
    async fn test_overfishing_backend_error() {
        let server = MockMarineServer::start().await;
        server.set(
            "/overfishing_monitor",
            RouteBehavior::Json(json!({"error": "Missing column: Catch_Volume"})),
        );
        let backend = HttpBackend::new(&server.config()).unwrap();
        let csv = FilePayload::new("catch.csv", b"Date,Stock_Volume\n".to_vec());

        let err = backend.analyze_overfishing(&csv).await.unwrap_err();
        assert!(err.is_backend_reported());
        assert_eq!(err.to_string(), "Missing column: Catch_Volume");
    }

    #[tokio::test]
    async fn test_species_chat_body() {
        let server = MockMarineServer::start().await;
        let backend = HttpBackend::new(&server.config()).unwrap();
        let profile = SpeciesProfile {
            species_common: "Lionfish".into(),
            ..Default::default()
        };

        let answer = backend.ask_species(&profile, "Is it venomous?").await.unwrap();
        assert!(!answer.is_empty());

        let sent: serde_json::Value =
            serde_json::from_slice(&server.last_body("/api/v1/edna/chat").unwrap()).unwrap();
        assert_eq!(sent["question"], "Is it venomous?");
        assert_eq!(sent["species_data"]["species_common"], "Lionfish");
    }

    #[tokio::test]
    async fn test_sst_hint_via_get() {
        let server = MockMarineServer::start().await;
        let backend = HttpBackend::new(&server.config()).unwrap();
        let hint = backend.sst_upload_hint().await.unwrap();
        assert!(hint.contains("/predict/sst/csv"));
        assert_eq!(server.hits("/predict/sst"), 1);
    }

    #[tokio::test]
    async fn test_edna_mistyped_profile_keeps_real_result() {
        let server = MockMarineServer::start().await;
        server.set(
            "/api/v1/edna/analyze",
            RouteBehavior::Json(json!({
                "detected_species": [
                    {"sequence": "ATGGCAAGCC", "species": "Thunnus albacares", "confidence": 94.2}
                ],
                "analysis": {
                    "species_common": "Yellowfin Tuna",
                    "ecological_role": null,
                    "genetic_markers": "COI"
                }
            })),
        );
        let backend = HttpBackend::new(&server.config()).unwrap();

        let result = backend
            .analyze_edna(&FilePayload::new("sample.fasta", b">s\nATGC\n".to_vec()))
            .await;
        assert!(!result.is_synthetic());
        assert!(result.failures.is_empty());
        assert_eq!(result.value.detected_species[0].species, "Thunnus albacares");
        assert_eq!(result.value.analysis.unwrap().name(), "Yellowfin Tuna");
    }

    #[test]
    fn test_describe() {
        let backend = HttpBackend::new(&ClientConfig::default()).unwrap();
        assert_eq!(backend.describe(), "http (http://127.0.0.1:8000)");
    }
}
