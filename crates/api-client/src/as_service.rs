//! Agent-service endpoints.

use crate::{ApiResponse, ClientError, NodeApi};

/// `POST /as/data/{request_id}/{service_id}` — fulfill a data request.
///
/// 400 with code 20025 once the request is closed.
pub async fn send_data(
    api: &NodeApi,
    request_id: &str,
    service_id: &str,
    body: &serde_json::Value,
) -> Result<ApiResponse, ClientError> {
    api.post(&format!("as/data/{request_id}/{service_id}"), body)
        .await
}

/// `POST /as/error/{request_id}/{service_id}` — report a service-side error
/// instead of data.
pub async fn send_error(
    api: &NodeApi,
    request_id: &str,
    service_id: &str,
    body: &serde_json::Value,
) -> Result<ApiResponse, ClientError> {
    api.post(&format!("as/error/{request_id}/{service_id}"), body)
        .await
}

/// `POST /as/service/{service_id}` — register or update this AS's offering.
pub async fn register_service(
    api: &NodeApi,
    service_id: &str,
    body: &serde_json::Value,
) -> Result<ApiResponse, ClientError> {
    api.post(&format!("as/service/{service_id}"), body).await
}
