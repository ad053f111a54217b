//! # Flow Model - Request Oracle
//!
//! Builds the expected shape of a protocol run from the parameters a test
//! supplied, so that observed callbacks are compared against a precomputed
//! oracle instead of ad hoc literals:
//!
//! - [`create_idp_id_list`] — the eligible IdPs, in the deterministic order
//!   the platform enumerates them
//! - [`create_data_request_list`] — per-service descriptors with salted
//!   param hashes and empty response lists
//! - [`create_request_message_hash`] — byte-comparable with the hash inside
//!   every `incoming_request` callback
//! - [`set_data_signed`] / [`set_data_received`] — keep the oracle in
//!   lock-step with AS actions; flags flip false to true, never back
//!
//! Everything here is pure and deterministic; any order or hash discrepancy
//! against an observed callback is a protocol nonconformance, not a harness
//! bug.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod hash;
pub mod model;
pub mod params;

// Re-export main types
pub use hash::{hash_with_salt, sha256_base64};
pub use model::{
    create_data_request_list, create_idp_id_list, create_request_message_hash,
    expected_service_counts, set_data_received, set_data_signed, DataRequestEntry,
    ServiceCounts,
};
pub use params::{CreateRequestParams, DataRequestParams, EligibleIdp};
