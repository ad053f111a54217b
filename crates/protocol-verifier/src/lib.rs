//! # Protocol Verifier - Scenario Fragments
//!
//! Library of reusable conformance checks over a request's lifecycle.
//! A scenario owns a [`TestContext`] (explicit, never global), builds a
//! [`RequestFlow`] oracle from its create-request parameters, registers
//! expectations *before* triggering actions, then feeds the resolved events
//! through the fragments:
//!
//! ```text
//! pending -> confirmed -> completed -> closed
//!    │           │            │           │
//!    └───────────┴────────────┴───────────┴── every step checked against
//!                                             the RequestFlow oracle and
//!                                             the block-height policy
//! ```
//!
//! Fragments never panic on a platform error: an `error`-typed resolution is
//! a valid, assertable outcome ([`FragmentOutcome::PlatformError`]), because
//! the platform may deliver an error instead of the success callback for the
//! same triggering action.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod context;
pub mod flow;
pub mod fragments;
pub mod height;

// Re-export main types
pub use context::{AccessorRecord, IdentityRecord, TestContext};
pub use flow::RequestFlow;
pub use fragments::{
    receive_completed_request_status, receive_confirmed_request_status,
    receive_message_queue_send_success, receive_pending_request_status,
    receive_request_closed_status, receive_request_timed_out_status, FragmentOutcome, VerifyError,
};
pub use height::{check_height_progress, HeightPolicy};
