//! # Correlation Registry
//!
//! Keyed collection of single-shot expectations. A caller registers interest
//! in a future callback and receives an [`Expectation`] handle that resolves
//! when a matching event is published.

use dashmap::DashMap;
use shared_types::{CallbackEvent, CallbackType, CorrelationKey};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Errors from awaiting an expectation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry was cleared (end-of-scenario cleanup) before a matching
    /// event arrived.
    #[error("Expectation cancelled before resolution")]
    Cancelled,

    /// `wait_for` elapsed without a matching event. The registry itself has
    /// no timeout; this comes from the caller-supplied bound.
    #[error("Expectation not resolved within {0:?}")]
    TimedOut(Duration),
}

/// Lookup key for the main expectation map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SlotKey {
    node_id: String,
    callback_type: CallbackType,
    key: CorrelationKey,
}

/// Lookup key for the message-queue side channel.
///
/// Transport confirmations carry no correlation key; they are matched on
/// `(sender node, destination node, request)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MqKey {
    pub node_id: String,
    pub destination_node_id: String,
    pub request_id: String,
}

/// Counters for registry activity. Relaxed ordering; these are
/// diagnostics, not synchronization.
#[derive(Debug, Default)]
pub struct RegistryStats {
    /// Total expectations registered.
    pub total_registered: AtomicU64,
    /// Total expectations resolved by a matching event.
    pub total_resolved: AtomicU64,
    /// Total events published with no matching expectation.
    pub total_dropped: AtomicU64,
}

/// A pending, single-shot subscription to a future callback.
///
/// Fulfilled exactly once; inert afterwards. Dropping the handle before
/// resolution abandons the slot (the registry removes it on next publish
/// attempt or on [`CorrelationRegistry::clear`]).
pub struct Expectation {
    receiver: oneshot::Receiver<CallbackEvent>,
}

impl Expectation {
    /// Await the matching event.
    ///
    /// Hangs forever if no matching event is ever published; the enclosing
    /// test framework's wall-clock timeout is the only backstop.
    pub async fn wait(self) -> Result<CallbackEvent, RegistryError> {
        self.receiver.await.map_err(|_| RegistryError::Cancelled)
    }

    /// Await the matching event with a caller-imposed bound.
    ///
    /// Convenience for tests; a `TimedOut` result is the "never resolved"
    /// diagnostic the scenario should fail with.
    pub async fn wait_for(self, bound: Duration) -> Result<CallbackEvent, RegistryError> {
        match tokio::time::timeout(bound, self.receiver).await {
            Ok(Ok(event)) => Ok(event),
            Ok(Err(_)) => Err(RegistryError::Cancelled),
            Err(_) => Err(RegistryError::TimedOut(bound)),
        }
    }
}

/// Registry of pending expectations.
///
/// ## Matching
///
/// [`publish`](Self::publish) resolves at most one expectation per slot:
/// the one whose `(node_id, callback_type, correlation_key)` equals the
/// event's. `error`-typed events additionally resolve one type-specific
/// expectation waiting on the same `(node_id, key)`, because the platform
/// delivers an error *instead of* the success callback for the same
/// triggering action.
///
/// ## Duplicate registrations
///
/// Two expectations may share an identical key; each publish resolves
/// exactly one of them and the dispatch order between duplicates is
/// unspecified. Scenarios must not rely on it.
pub struct CorrelationRegistry {
    /// Main expectation slots. A slot holds the duplicates for one key.
    slots: DashMap<SlotKey, Vec<oneshot::Sender<CallbackEvent>>>,

    /// Message-queue side channel slots.
    mq_slots: DashMap<MqKey, Vec<oneshot::Sender<CallbackEvent>>>,

    /// Activity counters.
    stats: Arc<RegistryStats>,
}

impl CorrelationRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            mq_slots: DashMap::new(),
            stats: Arc::new(RegistryStats::default()),
        }
    }

    /// Register interest in a future callback.
    ///
    /// Must happen before the triggering action completes, or the event may
    /// be published unmatched and dropped.
    pub fn register(
        &self,
        node_id: &str,
        callback_type: CallbackType,
        key: CorrelationKey,
    ) -> Expectation {
        let (tx, rx) = oneshot::channel();
        let slot_key = SlotKey {
            node_id: node_id.to_string(),
            callback_type,
            key,
        };

        debug!(
            node_id = node_id,
            callback_type = %callback_type,
            key = %slot_key.key,
            "Registered expectation"
        );

        self.slots.entry(slot_key).or_default().push(tx);
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        Expectation { receiver: rx }
    }

    /// Register interest in a transport delivery confirmation.
    pub fn register_mq(&self, key: MqKey) -> Expectation {
        let (tx, rx) = oneshot::channel();

        debug!(
            node_id = key.node_id,
            destination = key.destination_node_id,
            request_id = key.request_id,
            "Registered message-queue expectation"
        );

        self.mq_slots.entry(key).or_default().push(tx);
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        Expectation { receiver: rx }
    }

    /// Route an event to the matching expectation, if any.
    ///
    /// Returns the number of expectations resolved. Unmatched events are
    /// dropped with a debug log; there is no buffering and no replay.
    pub fn publish(&self, event: CallbackEvent) -> usize {
        if let shared_types::CallbackData::MessageQueueSendSuccess {
            destination_node_id,
            request_id,
            ..
        } = &event.data
        {
            let key = MqKey {
                node_id: event.node_id.clone(),
                destination_node_id: destination_node_id.clone(),
                request_id: request_id.clone(),
            };
            return self.resolve_mq(&key, event);
        }

        let Some(key) = event.correlation_key() else {
            self.stats.total_dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                node_id = event.node_id,
                callback_type = %event.callback_type(),
                "Event carries no correlation key, dropped"
            );
            return 0;
        };

        let mut resolved = self.resolve_slot(
            &SlotKey {
                node_id: event.node_id.clone(),
                callback_type: event.callback_type(),
                key: key.clone(),
            },
            &event,
        );

        // An error can arrive instead of the success callback the caller is
        // waiting on; make it visible to that type-specific waiter too.
        if event.callback_type() == CallbackType::Error {
            resolved += self.resolve_any_type(&event.node_id, &key, &event);
        }

        if resolved == 0 {
            self.stats.total_dropped.fetch_add(1, Ordering::Relaxed);
            debug!(
                node_id = event.node_id,
                callback_type = %event.callback_type(),
                key = %key,
                "No matching expectation, event dropped"
            );
        }
        resolved
    }

    /// Number of live expectations (both channels).
    #[must_use]
    pub fn pending_count(&self) -> usize {
        let main: usize = self.slots.iter().map(|entry| entry.value().len()).sum();
        let mq: usize = self.mq_slots.iter().map(|entry| entry.value().len()).sum();
        main + mq
    }

    /// End-of-scenario listener cleanup.
    ///
    /// Drops every pending slot so stale expectations cannot leak into the
    /// next scenario; abandoned waiters observe [`RegistryError::Cancelled`].
    pub fn clear(&self) {
        let dropped = self.pending_count();
        self.slots.clear();
        self.mq_slots.clear();
        if dropped > 0 {
            debug!(dropped = dropped, "Cleared pending expectations");
        }
    }

    /// Activity counters.
    #[must_use]
    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    fn resolve_slot(&self, slot_key: &SlotKey, event: &CallbackEvent) -> usize {
        let Some(mut slot) = self.slots.get_mut(slot_key) else {
            return 0;
        };

        // First live sender wins; already-dropped receivers are discarded.
        while let Some(sender) = slot.pop() {
            if sender.send(event.clone()).is_ok() {
                self.stats.total_resolved.fetch_add(1, Ordering::Relaxed);
                debug!(
                    node_id = slot_key.node_id,
                    callback_type = %slot_key.callback_type,
                    key = %slot_key.key,
                    "Expectation resolved"
                );
                if slot.is_empty() {
                    drop(slot);
                    self.slots.remove_if(slot_key, |_, v| v.is_empty());
                }
                return 1;
            }
        }
        drop(slot);
        self.slots.remove_if(slot_key, |_, v| v.is_empty());
        0
    }

    fn resolve_any_type(&self, node_id: &str, key: &CorrelationKey, event: &CallbackEvent) -> usize {
        let candidate = self.slots.iter().find_map(|entry| {
            let k = entry.key();
            (k.node_id == node_id && &k.key == key && k.callback_type != CallbackType::Error)
                .then(|| k.clone())
        });
        match candidate {
            Some(slot_key) => self.resolve_slot(&slot_key, event),
            None => 0,
        }
    }

    fn resolve_mq(&self, key: &MqKey, event: CallbackEvent) -> usize {
        let Some(mut slot) = self.mq_slots.get_mut(key) else {
            self.stats.total_dropped.fetch_add(1, Ordering::Relaxed);
            debug!(
                node_id = key.node_id,
                destination = key.destination_node_id,
                request_id = key.request_id,
                "No matching message-queue expectation, event dropped"
            );
            return 0;
        };
        while let Some(sender) = slot.pop() {
            if sender.send(event.clone()).is_ok() {
                self.stats.total_resolved.fetch_add(1, Ordering::Relaxed);
                if slot.is_empty() {
                    drop(slot);
                    self.mq_slots.remove_if(key, |_, v| v.is_empty());
                }
                return 1;
            }
        }
        drop(slot);
        self.mq_slots.remove_if(key, |_, v| v.is_empty());
        0
    }
}

impl Default for CorrelationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
