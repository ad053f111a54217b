//! Relying-party endpoints.

use crate::{ApiResponse, ClientError, NodeApi};

/// `POST /rp/requests/{namespace}/{identifier}` — create a request.
///
/// On 202 the body echoes `request_id` and the server-issued `initial_salt`
/// the oracle needs.
pub async fn create_request(
    api: &NodeApi,
    namespace: &str,
    identifier: &str,
    body: &serde_json::Value,
) -> Result<ApiResponse, ClientError> {
    api.post(&format!("rp/requests/{namespace}/{identifier}"), body)
        .await
}

/// `POST /rp/request_close` — close a request before it completes on its own.
pub async fn close_request(
    api: &NodeApi,
    body: &serde_json::Value,
) -> Result<ApiResponse, ClientError> {
    api.post("rp/request_close", body).await
}

/// `GET /rp/request_references/{reference_id}` — look up the request id a
/// reference maps to. 404 after the platform cleans the mapping up.
pub async fn get_request_id_by_reference(
    api: &NodeApi,
    reference_id: &str,
) -> Result<ApiResponse, ClientError> {
    api.get(&format!("rp/request_references/{reference_id}"))
        .await
}

/// `GET /rp/request_data/{request_id}` — data items received so far.
pub async fn get_request_data(
    api: &NodeApi,
    request_id: &str,
) -> Result<ApiResponse, ClientError> {
    api.get(&format!("rp/request_data/{request_id}")).await
}
