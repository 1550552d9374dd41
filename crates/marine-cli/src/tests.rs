//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::PathBuf;

use marine_core::test_utils::{MockMarineServer, RouteBehavior};
use marine_core::{MarineClient, QueryValue};
use serde_json::json;
use tempfile::TempDir;

use crate::commands::{self, parse_param};

/// Write a fixture file into a temp dir, returning its path
fn fixture(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn client(server: &MockMarineServer) -> MarineClient {
    MarineClient::from_config(&server.config()).unwrap()
}

// ========== Shared Utility Tests ==========

#[test]
fn test_parse_param_types() {
    assert_eq!(
        parse_param("species=tuna"),
        ("species".to_string(), QueryValue::Text("tuna".into()))
    );
    assert_eq!(
        parse_param("limit=5"),
        ("limit".to_string(), QueryValue::Number(5.0))
    );
    assert_eq!(
        parse_param("verbose=true"),
        ("verbose".to_string(), QueryValue::Bool(true))
    );
    assert_eq!(
        parse_param("region="),
        ("region".to_string(), QueryValue::Text(String::new()))
    );
    assert_eq!(
        parse_param("draft"),
        ("draft".to_string(), QueryValue::Absent)
    );
}

#[test]
fn test_load_config_flags_override_file() {
    let dir = TempDir::new().unwrap();
    let path = fixture(
        &dir,
        "client.toml",
        b"[api]\nbase_url = \"/api\"\norigin = \"http://file.local\"\ntimeout_secs = 5\n",
    );

    let config = commands::load_config(Some(&path), None, None).unwrap();
    assert_eq!(config.origin, "http://file.local");
    assert_eq!(config.timeout.as_secs(), 5);

    let config =
        commands::load_config(Some(&path), Some("https://api.example.com"), Some("http://x/"))
            .unwrap();
    assert_eq!(config.base_url, "https://api.example.com");
    assert_eq!(config.origin, "http://x");
}

#[test]
fn test_load_config_rejects_bad_toml() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "client.toml", b"[api\nbase_url = ");
    assert!(commands::load_config(Some(&path), None, None).is_err());
}

#[test]
fn test_load_config_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");
    let err = commands::load_config(Some(&missing), Some("/api"), None).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.toml"));
}

#[test]
fn test_build_client_mock_flag() {
    let config = marine_core::ClientConfig::default();
    assert!(commands::build_client(&config, true).unwrap().is_mock());
    assert!(!commands::build_client(&config, false).unwrap().is_mock());
}

#[test]
fn test_read_upload_missing_file() {
    let err = commands::read_upload(&PathBuf::from("/nonexistent/fish.jpg")).unwrap_err();
    assert!(err.to_string().contains("fish.jpg"));
}

#[test]
fn test_cmd_url() {
    let config = marine_core::ClientConfig::default().with_base_url("/api");
    let params = vec!["limit=5".to_string(), "draft".to_string()];
    assert!(commands::cmd_url(&config, "/predict/csv", &params, false).is_ok());
    assert!(commands::cmd_url(&config, "/predict/csv", &params, true).is_ok());
    assert!(commands::cmd_url(&config, "   ", &[], false).is_err());
}

#[test]
fn test_cmd_config() {
    let config = marine_core::ClientConfig::default();
    assert!(commands::cmd_config(&config, false, false).is_ok());
    assert!(commands::cmd_config(&config, true, true).is_ok());
}

// ========== Fisheries Command Tests ==========

#[tokio::test]
async fn test_cmd_classify() {
    let server = MockMarineServer::start().await;
    let dir = TempDir::new().unwrap();
    let image = fixture(&dir, "fish.jpg", &[0xFF, 0xD8, 0xFF, 0xE0]);

    assert!(commands::cmd_classify(&client(&server), &image, false)
        .await
        .is_ok());
    assert_eq!(server.hits("/predict/fish_species"), 1);
}

#[tokio::test]
async fn test_cmd_classify_succeeds_when_every_endpoint_fails() {
    let server = MockMarineServer::start().await;
    server.fail_all(500);
    let dir = TempDir::new().unwrap();
    let image = fixture(&dir, "fish.png", &[0x89, 0x50, 0x4E, 0x47]);

    assert!(commands::cmd_classify(&client(&server), &image, true)
        .await
        .is_ok());
    assert_eq!(server.hits("/api/v1/fish/classify"), 1);
}

#[tokio::test]
async fn test_cmd_overfishing() {
    let server = MockMarineServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv = fixture(
        &dir,
        "catch.csv",
        b"Date,Stock_Volume,Catch_Volume\n2024-01,1000,150\n",
    );

    assert!(commands::cmd_overfishing(&client(&server), &csv, false)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_cmd_overfishing_reports_backend_error() {
    let server = MockMarineServer::start().await;
    server.set(
        "/overfishing_monitor",
        RouteBehavior::Json(json!({"error": "CSV must contain Catch_Volume"})),
    );
    let dir = TempDir::new().unwrap();
    let csv = fixture(&dir, "catch.csv", b"Date,Stock_Volume\n2024-01,1000\n");

    let err = commands::cmd_overfishing(&client(&server), &csv, false)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Upload failed: CSV must contain Catch_Volume");
}

// ========== Ocean Command Tests ==========

#[tokio::test]
async fn test_cmd_chlorophyll() {
    let server = MockMarineServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv = fixture(&dir, "readings.csv", b"depth,salinity,ph\n5,35.1,8.1\n");

    assert!(commands::cmd_chlorophyll(&client(&server), &csv, false)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_cmd_chlorophyll_unreachable() {
    let server = MockMarineServer::start().await;
    server.set("/predict/csv", RouteBehavior::Status(502));
    let dir = TempDir::new().unwrap();
    let csv = fixture(&dir, "readings.csv", b"depth,salinity,ph\n5,35.1,8.1\n");

    let err = commands::cmd_chlorophyll(&client(&server), &csv, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Make sure the backend is running"));
}

#[tokio::test]
async fn test_cmd_sst_forecast_and_hint() {
    let server = MockMarineServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv = fixture(&dir, "sst.csv", b"date,value\n2024-01-01,27.4\n");

    assert!(commands::cmd_sst(&client(&server), Some(&csv), false, false)
        .await
        .is_ok());
    assert!(commands::cmd_sst(&client(&server), None, true, false)
        .await
        .is_ok());
    assert_eq!(server.hits("/predict/sst"), 1);
    assert!(commands::cmd_sst(&client(&server), None, false, false)
        .await
        .is_err());
}

// ========== Biodiversity Command Tests ==========

#[tokio::test]
async fn test_cmd_edna_with_questions() {
    let server = MockMarineServer::start().await;
    let dir = TempDir::new().unwrap();
    let fasta = fixture(&dir, "sample.fasta", b">SEQ_001\nATGGCAAGCCTACGAAAAACACACC\n");

    let questions = vec!["What does it eat?".to_string()];
    assert!(commands::cmd_edna(&client(&server), &fasta, &questions, false)
        .await
        .is_ok());
    assert_eq!(server.hits("/api/v1/edna/chat"), 1);
}

#[tokio::test]
async fn test_cmd_edna_fallback_skips_questions() {
    let server = MockMarineServer::start().await;
    server.set("/api/v1/edna/analyze", RouteBehavior::Status(503));
    let dir = TempDir::new().unwrap();
    let fasta = fixture(&dir, "sample.fasta", b">SEQ_001\nATGC\n");

    let questions = vec!["Habitat?".to_string()];
    assert!(commands::cmd_edna(&client(&server), &fasta, &questions, true)
        .await
        .is_ok());
    assert_eq!(server.hits("/api/v1/edna/chat"), 0);
}

// ========== Chat Command Tests ==========

#[tokio::test]
async fn test_cmd_chat() {
    let server = MockMarineServer::start().await;
    assert!(commands::cmd_chat(&client(&server), "Catch limits?", false)
        .await
        .is_ok());
    assert_eq!(server.hits("/aws/fisheries-agent"), 1);
}

#[tokio::test]
async fn test_cmd_chat_empty_question() {
    assert!(commands::cmd_chat(&MarineClient::mock(), "  ", false)
        .await
        .is_err());
}

#[tokio::test]
async fn test_commands_work_offline_with_mock() {
    let client = MarineClient::mock();
    let dir = TempDir::new().unwrap();
    let image = fixture(&dir, "fish.jpg", &[1, 2, 3]);
    let csv = fixture(
        &dir,
        "catch.csv",
        b"Date,Stock_Volume,Catch_Volume\n2024-01,1000,150\n",
    );

    assert!(commands::cmd_classify(&client, &image, false).await.is_ok());
    assert!(commands::cmd_overfishing(&client, &csv, false)
        .await
        .is_ok());
    assert!(commands::cmd_chat(&client, "hello", true).await.is_ok());
}
