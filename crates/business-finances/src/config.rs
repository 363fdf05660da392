//! Configuration for the profit & loss reporter

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::constants;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Bookkeeping backend section
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the bookkeeping API, e.g. https://books.example.com/api
    pub base_url: String,
    /// Bearer token sent with every request (optional)
    #[serde(default)]
    pub api_token: Option<String>,
}

/// HTTP client section
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> HttpConfig {
        HttpConfig {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<FileConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| {
            "Failed to parse config.toml. Check for:\n\
             - Missing required fields (backend.base_url)\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\n\
             See config.toml.example for the expected format."
        })
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Main configuration struct with parsed values
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL without trailing slash
    pub base_url: String,
    /// Bearer token for the backend (optional)
    pub api_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Config {
    /// Create config from file config and optional base URL override
    pub fn from_file(file_config: &FileConfig, base_url: Option<String>) -> Config {
        let base_url = base_url.unwrap_or_else(|| file_config.backend.base_url.clone());

        Config {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: file_config.backend.api_token.clone(),
            timeout: Duration::from_secs(file_config.http.timeout_secs),
        }
    }
}
