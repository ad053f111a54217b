//! # Shared Types - Callback Wire Format and Domain Entities
//!
//! Single Source of Truth for the types that cross the harness's boundaries:
//!
//! - **Callback model** — every webhook the external nodes can POST at us is a
//!   variant of [`CallbackData`], a closed tagged union over the `type`
//!   discriminator. Adding a callback type is a compile-time-checked change,
//!   never a silently-ignored string comparison.
//! - **Snapshots** — [`RequestStatusSnapshot`] and its service/validity
//!   sub-records, the shape every `request_status` callback must satisfy.
//! - **Block heights** — [`BlockHeight`], the `"<chain-id>:<height>"` composite
//!   version marker with the parsing rules the conformance checks depend on.
//! - **Errors** — platform business-error codes and the harness's own
//!   [`HarnessError`].

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod callback;
pub mod errors;
pub mod height;
pub mod status;

// Re-export main types
pub use callback::{CallbackData, CallbackEvent, CallbackType, CorrelationKey};
pub use errors::{ApiError, HarnessError};
pub use height::BlockHeight;
pub use status::{
    DataResponseEntry, NodeRole, RequestStatus, RequestStatusSnapshot, ResponseValidEntry,
    ServiceStatusEntry,
};

/// Callback API version the harness speaks.
pub const CALLBACK_API_VERSION: &str = "5.2";
