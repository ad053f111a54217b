//! Read-only utility endpoints.

use crate::{ApiResponse, ClientError, NodeApi};

/// `GET /utility/requests/{request_id}` — current request snapshot.
///
/// After `closed: true` this is idempotent; scenarios assert the terminal
/// snapshot never changes.
pub async fn get_request(api: &NodeApi, request_id: &str) -> Result<ApiResponse, ClientError> {
    api.get(&format!("utility/requests/{request_id}")).await
}

/// `GET /utility/idp?namespace=..&identifier=..&min_ial=..&min_aal=..` —
/// IdPs eligible for an identity, in platform enumeration order.
pub async fn get_eligible_idp_nodes(
    api: &NodeApi,
    namespace: &str,
    identifier: &str,
    min_ial: f64,
    min_aal: f64,
) -> Result<ApiResponse, ClientError> {
    api.get(&format!(
        "utility/idp?namespace={namespace}&identifier={identifier}&min_ial={min_ial}&min_aal={min_aal}"
    ))
    .await
}

/// `GET /utility/as/{service_id}` — AS nodes offering a service.
pub async fn get_service_providers(
    api: &NodeApi,
    service_id: &str,
) -> Result<ApiResponse, ClientError> {
    api.get(&format!("utility/as/{service_id}")).await
}

/// `GET /utility/nodes/{node_id}` — node metadata.
pub async fn get_node_info(api: &NodeApi, node_id: &str) -> Result<ApiResponse, ClientError> {
    api.get(&format!("utility/nodes/{node_id}")).await
}
