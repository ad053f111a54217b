//! # API Client - Role Endpoint Surface
//!
//! The boundary to the system under test. Each module wraps one role's
//! versioned REST endpoints (`{base}/{version}/rp/...`, `/idp/...`,
//! `/as/...`, `/ndid/...`, `/utility/...`) and returns the raw outcome as an
//! [`ApiResponse`] so scenarios can branch on the status code, which the
//! platform's race behavior requires.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod as_service;
pub mod config;
pub mod idp;
pub mod ndid;
pub mod response;
pub mod rp;
pub mod utility;

// Re-export main types
pub use config::ApiConfig;
pub use response::{ApiResponse, ClientError};

use tracing::debug;

/// Shared client over one node's API base.
#[derive(Debug, Clone)]
pub struct NodeApi {
    http: reqwest::Client,
    config: ApiConfig,
}

impl NodeApi {
    /// Build a client for one node endpoint.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `POST {base}/{version}/{path}` with a JSON body.
    pub async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.config.url(path);
        debug!(url = %url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        ApiResponse::read(response).await
    }

    /// `GET {base}/{version}/{path}`.
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ClientError> {
        let url = self.config.url(path);
        debug!(url = %url, "GET");
        let response = self.http.get(&url).send().await?;
        ApiResponse::read(response).await
    }
}
