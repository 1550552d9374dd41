//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_config` / `build_client` - Shared setup used by every command
//! - `read_upload` - Load a file selected for upload
//! - `cmd_url` - Show how a request path resolves
//! - `cmd_config` - Show the effective configuration

use std::path::Path;

use anyhow::{Context, Result};
use marine_core::{
    ClientConfig, FilePayload, MarineBackend, MarineClient, QueryParams, QueryValue, UrlBuilder,
};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Resolve configuration: file, then environment, then explicit flags
pub fn load_config(
    path: Option<&Path>,
    api_base: Option<&str>,
    origin: Option<&str>,
) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(path)
        .context("Failed to load client config")?
        .with_env();
    if let Some(base) = api_base {
        config = config.with_base_url(base);
    }
    if let Some(origin) = origin {
        config = config.with_origin(origin);
    }
    debug!(base = %config.base_url, origin = %config.origin, "Resolved client config");
    Ok(config)
}

/// HTTP client for the configured backend, or the offline mock
pub fn build_client(config: &ClientConfig, mock: bool) -> Result<MarineClient> {
    if mock {
        return Ok(MarineClient::mock());
    }
    MarineClient::from_config(config).context("Failed to create API client")
}

pub fn read_upload(path: &Path) -> Result<FilePayload> {
    FilePayload::from_path(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse `key=value`; a bare `key` yields an absent value
pub fn parse_param(raw: &str) -> (String, QueryValue) {
    let Some((key, value)) = raw.split_once('=') else {
        return (raw.trim().to_string(), QueryValue::Absent);
    };
    let key = key.trim().to_string();
    let value = match value {
        "true" => QueryValue::Bool(true),
        "false" => QueryValue::Bool(false),
        v => match v.parse::<f64>() {
            Ok(n) if n.is_finite() => QueryValue::Number(n),
            _ => QueryValue::Text(v.to_string()),
        },
    };
    (key, value)
}

pub fn cmd_url(config: &ClientConfig, path: &str, params: &[String], json: bool) -> Result<()> {
    let builder = UrlBuilder::from_config(config)?;
    let mut query = QueryParams::new();
    for raw in params {
        let (key, value) = parse_param(raw);
        query.insert(&key, value);
    }
    let resolved = builder
        .build(path, &query)
        .with_context(|| format!("Cannot resolve {:?}", path))?;
    let dispatched = resolved.with_origin(&config.origin);

    if json {
        return print_json(&json!({
            "resolved": resolved.as_str(),
            "absolute": resolved.is_absolute(),
            "dispatched": dispatched,
        }));
    }

    println!("🔗 {}", resolved);
    if !resolved.is_absolute() {
        println!("   Sent to: {}", dispatched);
    }
    Ok(())
}

pub fn cmd_config(config: &ClientConfig, mock: bool, json: bool) -> Result<()> {
    let backend = if mock {
        "mock".to_string()
    } else {
        MarineClient::from_config(config)?.describe()
    };

    if json {
        return print_json(&json!({
            "base_url": config.base_url,
            "origin": config.origin,
            "timeout_secs": config.timeout.as_secs(),
            "fish_endpoints": config.fish.ordered(),
            "backend": backend,
        }));
    }

    println!("⚙️  Marine Insights client");
    println!("   ─────────────────────────────");
    if config.is_proxied() {
        println!("   Base URL:  (none, origin-relative)");
    } else {
        println!("   Base URL:  {}", config.base_url);
    }
    println!("   Origin:    {}", config.origin);
    println!("   Timeout:   {}s", config.timeout.as_secs());
    println!("   Backend:   {}", backend);
    println!();
    println!("   Fish classification chain:");
    for (i, endpoint) in config.fish.ordered().iter().enumerate() {
        println!("     {}. {}", i + 1, endpoint);
    }
    println!("     {}. synthetic sample", config.fish.ordered().len() + 1);
    Ok(())
}
