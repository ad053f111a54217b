//! # Error Types
//!
//! Platform business errors as reported on the wire, the well-known error
//! codes the conformance scenarios assert against, and the harness's own
//! failure modes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Business error body, `{ "error": { "code": <int>, "message": <string> } }`.
///
/// Appears both in synchronous 400 responses and inside asynchronous
/// result callbacks with `success: false`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("platform error {code}: {message}")]
pub struct ApiError {
    pub code: i64,
    pub message: String,
}

/// Well-known platform error codes asserted by conformance scenarios.
pub mod codes {
    /// Consent rejected by the IdP.
    pub const CONSENT_REJECTED: i64 = 10016;
    /// Request is already closed.
    pub const REQUEST_ALREADY_CLOSED: i64 = 20025;
    /// Request is already timed out.
    pub const REQUEST_ALREADY_TIMED_OUT: i64 = 20026;
    /// Lost the race to a concurrent confirm (synchronous rejection).
    pub const RACE_LOST_TO_CONCURRENT_CONFIRM: i64 = 20081;
    /// Request is already completed (asynchronous rejection).
    pub const REQUEST_ALREADY_COMPLETED: i64 = 25004;
    /// Identifier count exceeds the allowed maximum.
    pub const IDENTIFIER_COUNT_EXCEEDED: i64 = 25068;
}

/// Errors that can occur inside the harness itself.
///
/// Distinct from [`ApiError`]: a platform error is an assertable outcome,
/// a `HarnessError` is a malfunction of the harness or a nonconforming
/// payload shape.
#[derive(Debug, Clone, Error)]
pub enum HarnessError {
    /// Webhook body failed minimal shape validation.
    #[error("Malformed webhook for node {node_id}: {reason}")]
    MalformedWebhook { node_id: String, reason: String },

    /// Block height string did not match `"<chain-id>:<height>"`.
    #[error("Malformed block height: {value:?}")]
    MalformedBlockHeight { value: String },

    /// A result-style callback carried neither `reference_id` nor
    /// `request_id`, so it cannot be correlated.
    #[error("Callback of type {callback_type} carries no correlation key")]
    MissingCorrelationKey { callback_type: String },
}
