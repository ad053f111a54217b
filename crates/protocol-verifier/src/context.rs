//! # Test Context
//!
//! Explicit per-scenario state: the registry, the per-node channel handles,
//! and the identity store. Passing this into every scenario (instead of
//! module-level globals) keeps scenarios from coupling through hidden state;
//! [`TestContext::shutdown`] is the scenario's listener cleanup.

use callback_bus::{AccessorSigner, CorrelationRegistry, Expectation, IngestState, MqKey, NodeChannel};
use parking_lot::RwLock;
use shared_types::{CallbackType, CorrelationKey, NodeRole};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// A registered accessor key pair bound to an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorRecord {
    pub accessor_id: String,
    /// IdP node holding the key.
    pub idp_id: String,
}

/// An onboarded identity as the harness knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub namespace: String,
    pub identifier: String,
    pub mode: u8,
    /// Platform-assigned group code, known after onboarding completes.
    pub reference_group_code: Option<String>,
    pub accessors: Vec<AccessorRecord>,
}

/// Per-scenario harness state.
pub struct TestContext {
    registry: Arc<CorrelationRegistry>,
    ingest: Arc<IngestState>,
    roles: RwLock<HashMap<String, NodeRole>>,
    identities: RwLock<Vec<IdentityRecord>>,
}

impl TestContext {
    /// Build a context with its own registry and ingestion state.
    #[must_use]
    pub fn new(signer: Arc<dyn AccessorSigner>) -> Self {
        let registry = Arc::new(CorrelationRegistry::new());
        let ingest = Arc::new(IngestState::new(registry.clone(), signer));
        Self {
            registry,
            ingest,
            roles: RwLock::new(HashMap::new()),
            identities: RwLock::new(Vec::new()),
        }
    }

    /// Declare a simulated node and its role.
    pub fn register_node(&self, node_id: &str, role: NodeRole) {
        debug!(node_id = node_id, role = ?role, "Node registered");
        self.roles.write().insert(node_id.to_string(), role);
        // Materialize the channel so the node's deliveries have a home even
        // before the first expectation.
        let _ = self.ingest.channel(node_id);
    }

    /// Role of a registered node.
    #[must_use]
    pub fn role(&self, node_id: &str) -> Option<NodeRole> {
        self.roles.read().get(node_id).copied()
    }

    /// Ingestion channel for a node.
    #[must_use]
    pub fn channel(&self, node_id: &str) -> Arc<NodeChannel> {
        self.ingest.channel(node_id)
    }

    /// The correlation registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<CorrelationRegistry> {
        &self.registry
    }

    /// Ingestion state, e.g. to mount the webhook router.
    #[must_use]
    pub fn ingest_state(&self) -> &Arc<IngestState> {
        &self.ingest
    }

    /// Register an expectation; shorthand for the registry call.
    #[must_use]
    pub fn expect(
        &self,
        node_id: &str,
        callback_type: CallbackType,
        key: impl Into<CorrelationKey>,
    ) -> Expectation {
        self.registry.register(node_id, callback_type, key.into())
    }

    /// Register a message-queue delivery expectation.
    #[must_use]
    pub fn expect_mq(&self, node_id: &str, destination_node_id: &str, request_id: &str) -> Expectation {
        self.registry.register_mq(MqKey {
            node_id: node_id.to_string(),
            destination_node_id: destination_node_id.to_string(),
            request_id: request_id.to_string(),
        })
    }

    /// Fresh reference id, unique per scenario run so concurrent scenarios
    /// sharing a node never cross-talk.
    #[must_use]
    pub fn generate_reference_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Store an onboarded identity.
    pub fn add_identity(&self, identity: IdentityRecord) {
        self.identities.write().push(identity);
    }

    /// Look up an identity by namespace and identifier.
    #[must_use]
    pub fn find_identity(&self, namespace: &str, identifier: &str) -> Option<IdentityRecord> {
        self.identities
            .read()
            .iter()
            .find(|i| i.namespace == namespace && i.identifier == identifier)
            .cloned()
    }

    /// Record the platform-assigned reference group code for an identity.
    pub fn set_reference_group_code(&self, namespace: &str, identifier: &str, code: &str) {
        let mut identities = self.identities.write();
        if let Some(identity) = identities
            .iter_mut()
            .find(|i| i.namespace == namespace && i.identifier == identifier)
        {
            identity.reference_group_code = Some(code.to_string());
        }
    }

    /// End-of-scenario cleanup: drop every pending expectation so stale
    /// listeners cannot leak into the next scenario.
    pub fn shutdown(&self) {
        self.registry.clear();
    }
}
