//! Identity-provider endpoints.

use crate::{ApiResponse, ClientError, NodeApi};

/// `POST /idp/response` — accept or reject an incoming request.
///
/// Accepted work is 202 with the result arriving as a `response_result`
/// callback; a request that already moved on answers 400 synchronously.
pub async fn create_response(
    api: &NodeApi,
    body: &serde_json::Value,
) -> Result<ApiResponse, ClientError> {
    api.post("idp/response", body).await
}

/// `POST /identity` — onboard an identity at this IdP.
pub async fn create_identity(
    api: &NodeApi,
    body: &serde_json::Value,
) -> Result<ApiResponse, ClientError> {
    api.post("identity", body).await
}

/// `POST /identity/{namespace}/{identifier}/accessors` — bind another
/// accessor key to an existing identity.
pub async fn add_accessor(
    api: &NodeApi,
    namespace: &str,
    identifier: &str,
    body: &serde_json::Value,
) -> Result<ApiResponse, ClientError> {
    api.post(
        &format!("identity/{namespace}/{identifier}/accessors"),
        body,
    )
    .await
}
