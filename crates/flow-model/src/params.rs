//! Parameters a test supplies to "create request", mirrored here so the
//! oracle is built from exactly what the RP sent.

use serde::{Deserialize, Serialize};

/// Per-service slice of a create-request call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRequestParams {
    pub service_id: String,
    /// AS nodes to target; empty means "any AS offering the service".
    #[serde(default)]
    pub as_id_list: Vec<String>,
    pub min_as: u32,
    /// Opaque service parameters, hashed into `request_params_hash`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_params: Option<String>,
}

/// The body of `POST /rp/requests/{namespace}/{identifier}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRequestParams {
    pub reference_id: String,
    pub mode: u8,
    pub namespace: String,
    pub identifier: String,
    /// Explicit IdP restriction; empty means "every eligible IdP".
    #[serde(default)]
    pub idp_id_list: Vec<String>,
    #[serde(default)]
    pub data_request_list: Vec<DataRequestParams>,
    pub request_message: String,
    pub min_ial: f64,
    pub min_aal: f64,
    pub min_idp: u32,
    pub request_timeout: u64,
}

/// One IdP as the platform enumerates it for the requested identity.
///
/// The enumeration order is the platform's; the oracle preserves it because
/// tests build comparison keys from list positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleIdp {
    pub node_id: String,
    /// Highest identity assurance level this IdP can vouch for.
    pub max_ial: f64,
    /// Highest authentication assurance level this IdP supports.
    pub max_aal: f64,
}
