//! # Callback Model
//!
//! Defines every webhook payload the external nodes can deliver to the
//! harness, as one closed tagged union over the `type` discriminator.
//! These correspond to the asynchronous results of the role APIs: a node
//! accepts a triggering HTTP call with 202 and later POSTs one of these
//! bodies to the callback URL registered for it.

use crate::errors::ApiError;
use crate::status::RequestStatusSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation key used to match a callback to the expectation awaiting it.
///
/// Derived from the payload: `reference_id` when the triggering caller
/// supplied one, `request_id` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationKey(String);

impl CorrelationKey {
    /// Wrap a raw key string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CorrelationKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CorrelationKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single inbound webhook, normalized.
///
/// Created the instant a webhook is ingested; immutable; discarded after
/// being dispatched to a matching expectation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackEvent {
    /// Node that emitted the callback. Filled from the body's `node_id`
    /// or, when absent, from the ingestion path segment.
    #[serde(default)]
    pub node_id: String,

    /// The typed payload.
    #[serde(flatten)]
    pub data: CallbackData,
}

impl CallbackEvent {
    /// The discriminator of the payload.
    #[must_use]
    pub fn callback_type(&self) -> CallbackType {
        self.data.callback_type()
    }

    /// Derive the correlation key: `reference_id` first, `request_id` second.
    #[must_use]
    pub fn correlation_key(&self) -> Option<CorrelationKey> {
        self.data.correlation_key()
    }

    /// The embedded platform error, if the payload carries one.
    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.data.error()
    }
}

/// Per-service entry of an `incoming_request` / `data_request` callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingDataRequest {
    /// Service being requested.
    pub service_id: String,
    /// AS nodes the request targets.
    #[serde(default)]
    pub as_id_list: Vec<String>,
    /// Minimum number of AS responses required.
    pub min_as: u32,
    /// Salted hash of the service request params.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_params_hash: Option<String>,
}

/// All webhook payloads, discriminated by the wire `type` field.
///
/// Exhaustive by construction: ingestion matches on this enum, so a new
/// callback type is a compile-time-checked change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackData {
    /// Result of `POST /rp/requests/{namespace}/{identifier}`.
    CreateRequestResult {
        success: bool,
        reference_id: String,
        request_id: String,
        /// `"<chain-id>:<height>"` at which the request hit the chain.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        creation_block_height: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ApiError>,
    },

    /// Delivered to an eligible IdP when a request names one of its
    /// onboarded identities.
    IncomingRequest {
        mode: u8,
        request_id: String,
        request_message: String,
        /// Hash the IdP must compare byte-for-byte against the oracle.
        request_message_hash: String,
        request_message_salt: String,
        requester_node_id: String,
        min_ial: f64,
        min_aal: f64,
        min_idp: u32,
        request_timeout: u64,
        #[serde(default)]
        data_request_list: Vec<IncomingDataRequest>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        creation_block_height: Option<String>,
    },

    /// Result of `POST /idp/response`.
    ResponseResult {
        success: bool,
        reference_id: String,
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ApiError>,
    },

    /// Result of `POST /rp/request_close`.
    CloseRequestResult {
        success: bool,
        reference_id: String,
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ApiError>,
    },

    /// Delivered to an AS once enough IdPs have confirmed.
    DataRequest {
        request_id: String,
        mode: u8,
        service_id: String,
        requester_node_id: String,
        max_ial: f64,
        max_aal: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_params: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        creation_block_height: Option<String>,
    },

    /// Result of `POST /as/data/{request_id}/{service_id}`.
    SendDataResult {
        success: bool,
        reference_id: String,
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ApiError>,
    },

    /// Periodic lifecycle snapshot for a request this node observes.
    RequestStatus(RequestStatusSnapshot),

    /// Result of identity onboarding at an IdP.
    CreateIdentityResult {
        success: bool,
        reference_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference_group_code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ApiError>,
    },

    /// Result of binding an additional accessor to an identity.
    AddAccessorResult {
        success: bool,
        reference_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ApiError>,
    },

    /// Result of a node-metadata mutation (`POST /node/update` and kin).
    UpdateNodeResult {
        success: bool,
        reference_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ApiError>,
    },

    /// Asynchronous failure delivered instead of a success callback.
    Error {
        error: ApiError,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// Side channel: the platform asks the IdP to sign a padded request
    /// hash with an accessor key. Request/response, not fire-and-forget.
    AccessorEncrypt {
        accessor_id: String,
        key_type: String,
        padding: String,
        reference_id: String,
        request_message_padded_hash: String,
    },

    /// Side channel: transport-layer delivery confirmation, keyed by
    /// `(node, destination, request)` rather than by correlation key.
    MessageQueueSendSuccess {
        destination_node_id: String,
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },

    /// Fan-out to other IdPs sharing an identity's reference group.
    IdentityModificationNotification {
        reference_group_code: String,
        action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        actor_node_id: Option<String>,
    },
}

impl CallbackData {
    /// Get the discriminator for this payload.
    #[must_use]
    pub fn callback_type(&self) -> CallbackType {
        match self {
            Self::CreateRequestResult { .. } => CallbackType::CreateRequestResult,
            Self::IncomingRequest { .. } => CallbackType::IncomingRequest,
            Self::ResponseResult { .. } => CallbackType::ResponseResult,
            Self::CloseRequestResult { .. } => CallbackType::CloseRequestResult,
            Self::DataRequest { .. } => CallbackType::DataRequest,
            Self::SendDataResult { .. } => CallbackType::SendDataResult,
            Self::RequestStatus(_) => CallbackType::RequestStatus,
            Self::CreateIdentityResult { .. } => CallbackType::CreateIdentityResult,
            Self::AddAccessorResult { .. } => CallbackType::AddAccessorResult,
            Self::UpdateNodeResult { .. } => CallbackType::UpdateNodeResult,
            Self::Error { .. } => CallbackType::Error,
            Self::AccessorEncrypt { .. } => CallbackType::AccessorEncrypt,
            Self::MessageQueueSendSuccess { .. } => CallbackType::MessageQueueSendSuccess,
            Self::IdentityModificationNotification { .. } => {
                CallbackType::IdentityModificationNotification
            }
        }
    }

    /// Correlation key: `reference_id` when present, `request_id` otherwise.
    ///
    /// `message_queue_send_success` callbacks return `None`; they are keyed
    /// by `(node, destination, request)` in a dedicated registry slot.
    #[must_use]
    pub fn correlation_key(&self) -> Option<CorrelationKey> {
        match self {
            Self::CreateRequestResult { reference_id, .. }
            | Self::ResponseResult { reference_id, .. }
            | Self::CloseRequestResult { reference_id, .. }
            | Self::SendDataResult { reference_id, .. }
            | Self::CreateIdentityResult { reference_id, .. }
            | Self::AddAccessorResult { reference_id, .. }
            | Self::UpdateNodeResult { reference_id, .. }
            | Self::AccessorEncrypt { reference_id, .. } => {
                Some(CorrelationKey::new(reference_id.clone()))
            }
            Self::IncomingRequest { request_id, .. } | Self::DataRequest { request_id, .. } => {
                Some(CorrelationKey::new(request_id.clone()))
            }
            Self::RequestStatus(snapshot) => Some(CorrelationKey::new(snapshot.request_id.clone())),
            Self::Error {
                reference_id,
                request_id,
                ..
            } => reference_id
                .clone()
                .or_else(|| request_id.clone())
                .map(CorrelationKey::new),
            Self::IdentityModificationNotification {
                reference_group_code,
                ..
            } => Some(CorrelationKey::new(reference_group_code.clone())),
            Self::MessageQueueSendSuccess { .. } => None,
        }
    }

    /// The embedded platform error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::CreateRequestResult { error, .. }
            | Self::ResponseResult { error, .. }
            | Self::CloseRequestResult { error, .. }
            | Self::SendDataResult { error, .. }
            | Self::CreateIdentityResult { error, .. }
            | Self::AddAccessorResult { error, .. }
            | Self::UpdateNodeResult { error, .. } => error.as_ref(),
            Self::Error { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Fieldless discriminator mirror of [`CallbackData`], used as a registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackType {
    CreateRequestResult,
    IncomingRequest,
    ResponseResult,
    CloseRequestResult,
    DataRequest,
    SendDataResult,
    RequestStatus,
    CreateIdentityResult,
    AddAccessorResult,
    UpdateNodeResult,
    Error,
    AccessorEncrypt,
    MessageQueueSendSuccess,
    IdentityModificationNotification,
}

impl fmt::Display for CallbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateRequestResult => "create_request_result",
            Self::IncomingRequest => "incoming_request",
            Self::ResponseResult => "response_result",
            Self::CloseRequestResult => "close_request_result",
            Self::DataRequest => "data_request",
            Self::SendDataResult => "send_data_result",
            Self::RequestStatus => "request_status",
            Self::CreateIdentityResult => "create_identity_result",
            Self::AddAccessorResult => "add_accessor_result",
            Self::UpdateNodeResult => "update_node_result",
            Self::Error => "error",
            Self::AccessorEncrypt => "accessor_encrypt",
            Self::MessageQueueSendSuccess => "message_queue_send_success",
            Self::IdentityModificationNotification => "identity_modification_notification",
        };
        write!(f, "{s}")
    }
}
