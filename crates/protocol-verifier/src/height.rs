//! Block-height assertion policy.
//!
//! A height string splits on `:`; both halves must be non-empty. Across
//! consecutive snapshots the integer must be non-decreasing for observers
//! that did not trigger a new on-chain transition, and strictly increasing
//! for the one that did.

use crate::fragments::VerifyError;
use shared_types::BlockHeight;

/// How the next observed height must relate to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightPolicy {
    /// `next >= prev` — same-height snapshots allowed.
    AtLeast,
    /// `next > prev` — a new on-chain state transition happened.
    StrictlyAfter,
}

/// Parse `next` and check it against `prev` under `policy`.
///
/// Returns the parsed height so callers can record it as the new baseline.
pub fn check_height_progress(
    prev: &BlockHeight,
    next: &str,
    policy: HeightPolicy,
) -> Result<BlockHeight, VerifyError> {
    let next = BlockHeight::parse(next)?;

    let ok = match policy {
        HeightPolicy::AtLeast => next.is_at_or_after(prev),
        HeightPolicy::StrictlyAfter => next.is_after(prev),
    };
    if !ok {
        return Err(VerifyError::Conformance {
            check: "block_height_progress",
            detail: format!(
                "height {next} violates {policy:?} relative to {prev}"
            ),
        });
    }
    Ok(next)
}
