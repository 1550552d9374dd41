//! Client configuration
//!
//! Process-wide settings are resolved once and then handed to the URL builder
//! and HTTP client by value. Nothing reads ambient state after startup.
//!
//! ## Configuration Resolution
//!
//! 1. Embedded defaults (compiled into binary)
//! 2. Override file (explicit path, or ~/.local/share/marine-insights/config/client.toml)
//! 3. `MARINE_API_BASE` environment variable
//! 4. Explicit setters (CLI flags)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/client.toml");

/// Environment variable holding the API base prefix
pub const API_BASE_ENV: &str = "MARINE_API_BASE";

/// Endpoint chain for fish classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FishEndpoints {
    /// Tried first
    pub primary: String,
    /// Tried in declaration order after the primary
    pub alternates: Vec<String>,
}

impl FishEndpoints {
    /// Primary followed by alternates
    pub fn ordered(&self) -> Vec<&str> {
        std::iter::once(self.primary.as_str())
            .chain(self.alternates.iter().map(String::as_str))
            .collect()
    }
}

impl Default for FishEndpoints {
    fn default() -> Self {
        Self {
            primary: "/predict/fish_species".to_string(),
            alternates: vec![
                "/classify/fish".to_string(),
                "/api/v1/fish/classify".to_string(),
            ],
        }
    }
}

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Prefix prepended to relative paths; empty means origin-relative requests
    pub base_url: String,
    /// Where origin-relative requests are actually sent
    pub origin: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Fish classification endpoint chain
    pub fish: FishEndpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            origin: "http://127.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(30),
            fish: FishEndpoints::default(),
        }
    }
}

impl ClientConfig {
    /// Load embedded defaults, then the override file
    ///
    /// An explicit path must exist; the per-user default is optional.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        if let Some(p) = override_path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
        }
        let path = override_path
            .map(Path::to_path_buf)
            .or_else(default_config_path);

        let content = match path {
            Some(ref p) if p.exists() => {
                debug!(path = %p.display(), "Loading client config override");
                fs::read_to_string(p)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
            }
            _ => DEFAULT_CONFIG.to_string(),
        };

        parse_config(&content)
    }

    /// Apply `MARINE_API_BASE` if set
    pub fn with_env(self) -> Self {
        match std::env::var(API_BASE_ENV) {
            Ok(base) => self.with_base_url(&base),
            Err(_) => self,
        }
    }

    /// Override the base prefix
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim().to_string();
        self
    }

    /// Override the origin used for origin-relative requests
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.trim_end_matches('/').to_string();
        self
    }

    /// Whether requests go through a same-origin proxy
    pub fn is_proxied(&self) -> bool {
        self.base_url.is_empty()
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| {
        d.join("marine-insights")
            .join("config")
            .join("client.toml")
    })
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    api: Option<RawApi>,
    fish: Option<RawFish>,
}

#[derive(Debug, Deserialize)]
struct RawApi {
    base_url: Option<String>,
    origin: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawFish {
    primary: Option<String>,
    alternates: Option<Vec<String>>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<ClientConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = ClientConfig::default();

    if let Some(api) = raw.api {
        if let Some(base) = api.base_url {
            config = config.with_base_url(&base);
        }
        if let Some(origin) = api.origin {
            if origin.trim().is_empty() {
                return Err(Error::Config("api.origin must not be empty".into()));
            }
            config = config.with_origin(&origin);
        }
        if let Some(timeout) = api.timeout_secs {
            config.timeout = Duration::from_secs(timeout);
        }
    }

    if let Some(fish) = raw.fish {
        if let Some(primary) = fish.primary {
            config.fish.primary = primary;
        }
        if let Some(alternates) = fish.alternates {
            config.fish.alternates = alternates;
        }
    }

    Ok(config)
}
