//! Per-node API endpoint configuration.

use serde::{Deserialize, Serialize};

/// Where one node's API lives and which API version to speak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// e.g. `http://127.0.0.1:8200`.
    pub base_url: String,
    /// e.g. `v5`.
    pub api_version: String,
}

impl ApiConfig {
    /// Build a config for a base URL with the default API version.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: "v5".to_string(),
        }
    }

    /// Read `NDID_API_BASE_URL` / `NDID_API_VERSION` with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("NDID_API_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8200".to_string()),
            api_version: std::env::var("NDID_API_VERSION").unwrap_or_else(|_| "v5".to_string()),
        }
    }

    /// Full URL for an API path (path given without leading slash).
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            path
        )
    }
}
