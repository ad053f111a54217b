//! # Callback Bus - Webhook Ingestion and Correlation
//!
//! The asynchronous half of the harness. Tests never poll the platform for
//! results; they register an expectation *before* triggering the action that
//! will eventually produce a callback, then await the expectation.
//!
//! ```text
//! ┌──────────────┐                        ┌──────────────────────┐
//! │ Test scenario│  register(node,type,   │ CorrelationRegistry  │
//! │              │  key) ────────────────→│  (one-shot slots)    │
//! │   await ◀────┼────────────────────────│                      │
//! └──────────────┘        resolve         └──────────▲───────────┘
//!                                                    │ publish
//!                                         ┌──────────┴───────────┐
//!   external node ──POST /callback/:id──→ │ NodeChannel / Router │
//!                                         └──────────────────────┘
//! ```
//!
//! ## Contract
//!
//! - **Single-shot**: an expectation resolves at most once; later matching
//!   events are not delivered to it.
//! - **First match wins, no buffering**: an event with no live matching
//!   expectation is dropped. Register before triggering, or lose the event.
//! - **Node-scoped**: delivery never crosses node ids; concurrently running
//!   IdPs/ASs are multiplexed by the ingestion path segment.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod channel;
pub mod registry;
pub mod router;

// Re-export main types
pub use channel::{AccessorSigner, NodeChannel};
pub use registry::{CorrelationRegistry, Expectation, MqKey, RegistryError, RegistryStats};
pub use router::{callback_router, IngestState};
