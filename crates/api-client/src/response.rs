//! Raw API outcome: status code plus parsed JSON body, with helpers for
//! the platform's `{ error: { code, message } }` failure shape.

use shared_types::ApiError;
use thiserror::Error;

/// Transport-level failure. Business failures are not errors here; they
/// come back as an [`ApiResponse`] with a 4xx status.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP call itself failed (connection refused, timeout, ...).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Outcome of one API call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed body, `Null` for empty 204-style responses.
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Drain a reqwest response into status + JSON body.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, ClientError> {
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        Ok(Self { status, body })
    }

    /// Build a response directly (simulated platforms in tests use this).
    #[must_use]
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Accepted for asynchronous processing.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, 200 | 201 | 202 | 204)
    }

    /// The business error in a 400 body, if present.
    #[must_use]
    pub fn error(&self) -> Option<ApiError> {
        serde_json::from_value(self.body.get("error")?.clone()).ok()
    }

    /// The business error code, if present.
    #[must_use]
    pub fn error_code(&self) -> Option<i64> {
        self.error().map(|e| e.code)
    }

    /// String field of the body, e.g. `initial_salt` or `request_id`.
    #[must_use]
    pub fn body_str(&self, field: &str) -> Option<&str> {
        self.body.get(field)?.as_str()
    }
}
