//! # Request Lifecycle Snapshots
//!
//! The `request_status` payload and its sub-records, plus node roles.
//! Conformance checks compare these against the oracle in `flow-model`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a simulated node plays in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Relying Party — creates requests.
    Rp,
    /// Identity Provider — confirms or rejects requests.
    Idp,
    /// Agent/data Service — fulfills data requests.
    As,
    /// Governance node.
    Ndid,
    /// Proxy fronting other nodes.
    Proxy,
}

impl NodeRole {
    /// Whether this observer is the requesting role.
    ///
    /// The platform withholds cryptographic-validity opinions from
    /// non-requesting roles; snapshot checks gate on this.
    #[must_use]
    pub fn is_rp(self) -> bool {
        matches!(self, Self::Rp)
    }
}

/// Lifecycle phase of a request.
///
/// Any single node's observations must be a non-decreasing walk through
/// `Pending -> Confirmed -> Completed`; the derived `Ord` encodes that walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Confirmed,
    Completed,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Per-service aggregate inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatusEntry {
    pub service_id: String,
    pub min_as: u32,
    /// AS responses signed on chain so far.
    pub signed_data_count: u32,
    /// Data items actually received by the RP so far.
    pub received_data_count: u32,
}

/// Per-IdP validity opinion inside a snapshot.
///
/// `None` on the wire is JSON `null`: the platform reports real booleans
/// only to the RP that created the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseValidEntry {
    pub idp_id: String,
    pub valid_signature: Option<bool>,
    pub valid_ial: Option<bool>,
}

/// Per-AS response record inside a data-request descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponseEntry {
    pub as_id: String,
    pub signed: bool,
    pub received: bool,
}

/// The `request_status` callback payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestStatusSnapshot {
    pub request_id: String,
    pub status: RequestStatus,
    pub mode: u8,
    pub min_idp: u32,
    pub answered_idp_count: u32,
    pub closed: bool,
    pub timed_out: bool,
    #[serde(default)]
    pub service_list: Vec<ServiceStatusEntry>,
    #[serde(default)]
    pub response_valid_list: Vec<ResponseValidEntry>,
    /// `"<chain-id>:<height>"` of the state this snapshot reflects.
    pub block_height: String,
}
