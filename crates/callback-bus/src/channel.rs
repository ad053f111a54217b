//! # Callback Ingestion Channel
//!
//! Per-node ingestion of raw webhook bodies: minimal shape validation,
//! normalization into [`CallbackEvent`], and publication to the registry.
//! One channel instance exists per simulated node identity so concurrently
//! running IdPs/ASs never cross-deliver.

use crate::registry::CorrelationRegistry;
use shared_types::{CallbackData, CallbackEvent, CallbackType, HarnessError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Signs the padded request hash delivered on the `accessor_encrypt` side
/// channel. The webhook response body must carry the signature, so this
/// delivery is request/response rather than fire-and-forget.
pub trait AccessorSigner: Send + Sync {
    /// Produce the signature for `request_message_padded_hash` with the
    /// accessor key identified by `accessor_id`.
    fn sign(&self, accessor_id: &str, request_message_padded_hash: &str) -> String;
}

impl<F> AccessorSigner for F
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn sign(&self, accessor_id: &str, request_message_padded_hash: &str) -> String {
        self(accessor_id, request_message_padded_hash)
    }
}

/// Ingestion channel for one simulated node.
pub struct NodeChannel {
    node_id: String,
    registry: Arc<CorrelationRegistry>,
}

impl NodeChannel {
    /// Create a channel for `node_id` publishing into `registry`.
    #[must_use]
    pub fn new(node_id: impl Into<String>, registry: Arc<CorrelationRegistry>) -> Self {
        Self {
            node_id: node_id.into(),
            registry,
        }
    }

    /// Node identity this channel serves.
    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Registry this channel publishes into.
    #[must_use]
    pub fn registry(&self) -> &Arc<CorrelationRegistry> {
        &self.registry
    }

    /// Ingest a main-stream webhook body.
    ///
    /// Validates that the body parses against the closed callback union and
    /// that result-style callbacks carry a correlation key, then publishes.
    /// Returns the number of expectations the event resolved (0 means the
    /// event was dropped — a legal outcome, see the crate contract).
    pub fn ingest(&self, body: serde_json::Value) -> Result<usize, HarnessError> {
        let event = self.normalize(body)?;

        if event.correlation_key().is_none()
            && event.callback_type() != CallbackType::MessageQueueSendSuccess
        {
            return Err(HarnessError::MissingCorrelationKey {
                callback_type: event.callback_type().to_string(),
            });
        }

        debug!(
            node_id = self.node_id,
            callback_type = %event.callback_type(),
            "Webhook ingested"
        );
        Ok(self.registry.publish(event))
    }

    /// Ingest an `accessor_encrypt` side-channel body.
    ///
    /// Publishes the event (so a scenario can observe that the platform
    /// asked for a signature) and synchronously returns the response body
    /// the webhook must answer with.
    pub fn ingest_accessor_encrypt(
        &self,
        body: serde_json::Value,
        signer: &dyn AccessorSigner,
    ) -> Result<serde_json::Value, HarnessError> {
        let event = self.normalize(body)?;

        let CallbackData::AccessorEncrypt {
            accessor_id,
            request_message_padded_hash,
            ..
        } = &event.data
        else {
            return Err(HarnessError::MalformedWebhook {
                node_id: self.node_id.clone(),
                reason: format!(
                    "expected accessor_encrypt on the side channel, got {}",
                    event.callback_type()
                ),
            });
        };

        let signature = signer.sign(accessor_id, request_message_padded_hash);
        self.registry.publish(event.clone());

        Ok(serde_json::json!({ "signature": signature }))
    }

    /// Ingest a `message_queue_send_success` side-channel body.
    pub fn ingest_mq(&self, body: serde_json::Value) -> Result<usize, HarnessError> {
        let event = self.normalize(body)?;

        if event.callback_type() != CallbackType::MessageQueueSendSuccess {
            return Err(HarnessError::MalformedWebhook {
                node_id: self.node_id.clone(),
                reason: format!(
                    "expected message_queue_send_success on the side channel, got {}",
                    event.callback_type()
                ),
            });
        }
        Ok(self.registry.publish(event))
    }

    fn normalize(&self, body: serde_json::Value) -> Result<CallbackEvent, HarnessError> {
        let mut event: CallbackEvent =
            serde_json::from_value(body).map_err(|e| {
                warn!(node_id = self.node_id, error = %e, "Webhook failed shape validation");
                HarnessError::MalformedWebhook {
                    node_id: self.node_id.clone(),
                    reason: e.to_string(),
                }
            })?;

        if event.node_id.is_empty() {
            event.node_id = self.node_id.clone();
        } else if event.node_id != self.node_id {
            // Path segment is authoritative; a mismatched body node_id is a
            // delivery to the wrong channel.
            return Err(HarnessError::MalformedWebhook {
                node_id: self.node_id.clone(),
                reason: format!("body node_id {:?} does not match channel", event.node_id),
            });
        }
        Ok(event)
    }
}
