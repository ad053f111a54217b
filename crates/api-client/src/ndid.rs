//! Governance-node endpoints. All mutations share one wire shape, so a
//! single passthrough keeps this as thin as the rest of the surface.

use crate::{ApiResponse, ClientError, NodeApi};

/// `POST /ndid/{action}` — governance mutation (register namespace, add
/// service, set allowed identifier counts, ...).
pub async fn governance(
    api: &NodeApi,
    action: &str,
    body: &serde_json::Value,
) -> Result<ApiResponse, ClientError> {
    api.post(&format!("ndid/{action}"), body).await
}
