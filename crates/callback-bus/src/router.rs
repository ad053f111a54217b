//! # Webhook Router
//!
//! Axum surface the external nodes POST their callbacks to. Nodes are
//! multiplexed by the path's node-id segment:
//!
//! - `POST /callback/:node_id` — main callback stream, answered 204
//! - `POST /accessor/:node_id` — `accessor_encrypt` side channel, the
//!   response body carries the signature
//! - `POST /mq/:node_id` — `message_queue_send_success` side channel
//!
//! Acknowledging a webhook (2xx) is what makes the external node consider
//! delivery successful, so even dropped events are acknowledged; only a
//! malformed body earns a 400.

use crate::channel::{AccessorSigner, NodeChannel};
use crate::registry::CorrelationRegistry;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::warn;

/// Shared state for the webhook router.
pub struct IngestState {
    registry: Arc<CorrelationRegistry>,
    channels: DashMap<String, Arc<NodeChannel>>,
    signer: Arc<dyn AccessorSigner>,
}

impl IngestState {
    /// Build state around a registry and the accessor signer.
    #[must_use]
    pub fn new(registry: Arc<CorrelationRegistry>, signer: Arc<dyn AccessorSigner>) -> Self {
        Self {
            registry,
            channels: DashMap::new(),
            signer,
        }
    }

    /// Channel for `node_id`, created on first delivery.
    #[must_use]
    pub fn channel(&self, node_id: &str) -> Arc<NodeChannel> {
        self.channels
            .entry(node_id.to_string())
            .or_insert_with(|| Arc::new(NodeChannel::new(node_id, self.registry.clone())))
            .clone()
    }

    /// The registry behind every channel.
    #[must_use]
    pub fn registry(&self) -> &Arc<CorrelationRegistry> {
        &self.registry
    }
}

/// Build the webhook router.
#[must_use]
pub fn callback_router(state: Arc<IngestState>) -> Router {
    Router::new()
        .route("/callback/:node_id", post(handle_callback))
        .route("/accessor/:node_id", post(handle_accessor))
        .route("/mq/:node_id", post(handle_mq))
        .with_state(state)
}

async fn handle_callback(
    State(state): State<Arc<IngestState>>,
    Path(node_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    match state.channel(&node_id).ingest(body) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => reject(&node_id, &e),
    }
}

async fn handle_accessor(
    State(state): State<Arc<IngestState>>,
    Path(node_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    match state
        .channel(&node_id)
        .ingest_accessor_encrypt(body, state.signer.as_ref())
    {
        Ok(response_body) => (StatusCode::OK, Json(response_body)).into_response(),
        Err(e) => reject(&node_id, &e),
    }
}

async fn handle_mq(
    State(state): State<Arc<IngestState>>,
    Path(node_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    match state.channel(&node_id).ingest_mq(body) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => reject(&node_id, &e),
    }
}

fn reject(node_id: &str, error: &shared_types::HarnessError) -> Response {
    warn!(node_id = node_id, error = %error, "Webhook rejected");
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "message": error.to_string() })),
    )
        .into_response()
}
