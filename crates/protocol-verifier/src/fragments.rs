//! # Scenario Fragments
//!
//! One function per lifecycle step. Each awaits an already-registered
//! expectation, checks the resolved callback against the [`RequestFlow`]
//! oracle, records the observation, and returns what actually happened.

use crate::flow::RequestFlow;
use crate::height::{check_height_progress, HeightPolicy};
use callback_bus::{Expectation, RegistryError};
use shared_types::{
    ApiError, CallbackData, CallbackEvent, HarnessError, NodeRole, RequestStatus,
    RequestStatusSnapshot,
};
use thiserror::Error;
use tracing::debug;

/// A fragment failed: the harness, not the platform, considers the run
/// nonconforming.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The expectation was cancelled (scenario cleanup) or timed out.
    #[error("Expectation failed: {0}")]
    Expectation(#[from] RegistryError),

    /// A callback of the wrong shape resolved the expectation.
    #[error("Expected {expected} callback, got {actual}")]
    UnexpectedCallback {
        expected: &'static str,
        actual: String,
    },

    /// A conformance check failed.
    #[error("Conformance check {check} failed: {detail}")]
    Conformance {
        check: &'static str,
        detail: String,
    },

    /// Malformed payload field (e.g. block height).
    #[error(transparent)]
    Height(#[from] HarnessError),
}

/// What a fragment observed. A platform error is an assertable outcome,
/// never a harness failure.
#[derive(Debug, Clone)]
pub enum FragmentOutcome {
    /// The awaited snapshot arrived and passed every check.
    Verified(RequestStatusSnapshot),
    /// A transport delivery confirmation arrived (message-queue fragment).
    Delivered {
        destination_node_id: String,
        request_id: String,
    },
    /// The platform delivered an `error` callback instead.
    PlatformError(ApiError),
}

impl FragmentOutcome {
    /// Unwrap the verified snapshot; a platform error becomes a
    /// [`VerifyError::Conformance`] with the error's code in the detail.
    pub fn into_verified(self) -> Result<RequestStatusSnapshot, VerifyError> {
        match self {
            Self::Verified(snapshot) => Ok(snapshot),
            Self::PlatformError(error) => Err(VerifyError::Conformance {
                check: "expected_success",
                detail: format!("platform answered with error {error}"),
            }),
            Self::Delivered { .. } => Err(VerifyError::UnexpectedCallback {
                expected: "request_status",
                actual: "message_queue_send_success".to_string(),
            }),
        }
    }

    /// The platform error, if that is what arrived.
    #[must_use]
    pub fn platform_error(&self) -> Option<&ApiError> {
        match self {
            Self::PlatformError(error) => Some(error),
            _ => None,
        }
    }
}

/// Await the `pending` snapshot on `node_id`.
///
/// Asserts a zero-progress view: no answered IdPs, zeroed service counts,
/// empty validity list, and a block height strictly past the creation
/// height.
pub async fn receive_pending_request_status(
    flow: &mut RequestFlow,
    node_id: &str,
    expectation: Expectation,
) -> Result<FragmentOutcome, VerifyError> {
    let snapshot = match await_snapshot(expectation).await? {
        SnapshotOrError::Snapshot(s) => s,
        SnapshotOrError::Error(e) => return Ok(FragmentOutcome::PlatformError(e)),
    };

    let height = verify_common(
        flow,
        node_id,
        &snapshot,
        RequestStatus::Pending,
        HeightPolicy::StrictlyAfter,
    )?;

    ensure(
        "pending_answered_idp_count",
        snapshot.answered_idp_count == 0,
        || format!("answered_idp_count = {}", snapshot.answered_idp_count),
    )?;
    ensure(
        "pending_response_valid_list",
        snapshot.response_valid_list.is_empty(),
        || format!("{} entries", snapshot.response_valid_list.len()),
    )?;
    for service in &snapshot.service_list {
        ensure("pending_service_counts", service.signed_data_count == 0, || {
            format!("service {} signed_data_count = {}", service.service_id, service.signed_data_count)
        })?;
        ensure("pending_service_counts", service.received_data_count == 0, || {
            format!("service {} received_data_count = {}", service.service_id, service.received_data_count)
        })?;
    }
    ensure("pending_not_closed", !snapshot.closed && !snapshot.timed_out, || {
        format!("closed = {}, timed_out = {}", snapshot.closed, snapshot.timed_out)
    })?;

    record(flow, node_id, &snapshot, height);
    Ok(FragmentOutcome::Verified(snapshot))
}

/// Await a `confirmed` snapshot on `node_id`.
///
/// `answered_idp_ids` are the IdPs the scenario had respond so far.
/// `observer_role` gates the validity-visibility rule: the RP sees real
/// booleans, everyone else sees null.
pub async fn receive_confirmed_request_status(
    flow: &mut RequestFlow,
    node_id: &str,
    observer_role: NodeRole,
    answered_idp_ids: &[String],
    height_policy: HeightPolicy,
    expectation: Expectation,
) -> Result<FragmentOutcome, VerifyError> {
    let snapshot = match await_snapshot(expectation).await? {
        SnapshotOrError::Snapshot(s) => s,
        SnapshotOrError::Error(e) => return Ok(FragmentOutcome::PlatformError(e)),
    };

    let height = verify_common(
        flow,
        node_id,
        &snapshot,
        RequestStatus::Confirmed,
        height_policy,
    )?;

    verify_answered(flow, &snapshot, answered_idp_ids, observer_role)?;
    verify_service_counts(flow, &snapshot, false)?;
    ensure("confirmed_not_closed", !snapshot.closed, || "closed = true".to_string())?;

    record(flow, node_id, &snapshot, height);
    Ok(FragmentOutcome::Verified(snapshot))
}

/// Await a `completed` snapshot on `node_id`; as `confirmed`, additionally
/// asserting `received_data_count` reflects every AS send.
pub async fn receive_completed_request_status(
    flow: &mut RequestFlow,
    node_id: &str,
    observer_role: NodeRole,
    answered_idp_ids: &[String],
    height_policy: HeightPolicy,
    expectation: Expectation,
) -> Result<FragmentOutcome, VerifyError> {
    let snapshot = match await_snapshot(expectation).await? {
        SnapshotOrError::Snapshot(s) => s,
        SnapshotOrError::Error(e) => return Ok(FragmentOutcome::PlatformError(e)),
    };

    let height = verify_common(
        flow,
        node_id,
        &snapshot,
        RequestStatus::Completed,
        height_policy,
    )?;

    verify_answered(flow, &snapshot, answered_idp_ids, observer_role)?;
    verify_service_counts(flow, &snapshot, true)?;

    record(flow, node_id, &snapshot, height);
    Ok(FragmentOutcome::Verified(snapshot))
}

/// Await the closed snapshot: `closed = true`, `status = completed`, and a
/// block height strictly greater than the last update's.
pub async fn receive_request_closed_status(
    flow: &mut RequestFlow,
    node_id: &str,
    expectation: Expectation,
) -> Result<FragmentOutcome, VerifyError> {
    let snapshot = match await_snapshot(expectation).await? {
        SnapshotOrError::Snapshot(s) => s,
        SnapshotOrError::Error(e) => return Ok(FragmentOutcome::PlatformError(e)),
    };

    let height = verify_common(
        flow,
        node_id,
        &snapshot,
        RequestStatus::Completed,
        HeightPolicy::StrictlyAfter,
    )?;

    ensure("closed_flag", snapshot.closed, || "closed = false".to_string())?;
    verify_service_counts(flow, &snapshot, true)?;

    record(flow, node_id, &snapshot, height);
    Ok(FragmentOutcome::Verified(snapshot))
}

/// Await the timed-out snapshot: still `pending`, with `timed_out = true`.
pub async fn receive_request_timed_out_status(
    flow: &mut RequestFlow,
    node_id: &str,
    expectation: Expectation,
) -> Result<FragmentOutcome, VerifyError> {
    let snapshot = match await_snapshot(expectation).await? {
        SnapshotOrError::Snapshot(s) => s,
        SnapshotOrError::Error(e) => return Ok(FragmentOutcome::PlatformError(e)),
    };

    let height = verify_common(
        flow,
        node_id,
        &snapshot,
        RequestStatus::Pending,
        HeightPolicy::AtLeast,
    )?;

    ensure("timed_out_flag", snapshot.timed_out, || "timed_out = false".to_string())?;
    ensure(
        "timed_out_answered_idp_count",
        snapshot.answered_idp_count == 0,
        || format!("answered_idp_count = {}", snapshot.answered_idp_count),
    )?;

    record(flow, node_id, &snapshot, height);
    Ok(FragmentOutcome::Verified(snapshot))
}

/// Await a transport delivery confirmation for `(request, destination)`.
///
/// Used to sequence steps: a dependent action is only asserted once the
/// message to its node is provably in flight.
pub async fn receive_message_queue_send_success(
    request_id: &str,
    destination_node_id: &str,
    expectation: Expectation,
) -> Result<FragmentOutcome, VerifyError> {
    let event = expectation.wait().await?;

    let CallbackData::MessageQueueSendSuccess {
        destination_node_id: actual_destination,
        request_id: actual_request,
        ..
    } = &event.data
    else {
        return Err(unexpected("message_queue_send_success", &event));
    };

    ensure(
        "mq_destination",
        actual_destination == destination_node_id,
        || format!("destination {actual_destination}, expected {destination_node_id}"),
    )?;
    ensure("mq_request_id", actual_request == request_id, || {
        format!("request {actual_request}, expected {request_id}")
    })?;

    debug!(
        node_id = event.node_id,
        destination = destination_node_id,
        request_id = request_id,
        "Message-queue delivery confirmed"
    );
    Ok(FragmentOutcome::Delivered {
        destination_node_id: actual_destination.clone(),
        request_id: actual_request.clone(),
    })
}

enum SnapshotOrError {
    Snapshot(RequestStatusSnapshot),
    Error(ApiError),
}

async fn await_snapshot(expectation: Expectation) -> Result<SnapshotOrError, VerifyError> {
    let event = expectation.wait().await?;
    match event.data {
        CallbackData::RequestStatus(snapshot) => Ok(SnapshotOrError::Snapshot(snapshot)),
        CallbackData::Error { error, .. } => Ok(SnapshotOrError::Error(error)),
        _ => Err(unexpected("request_status", &event)),
    }
}

fn unexpected(expected: &'static str, event: &CallbackEvent) -> VerifyError {
    VerifyError::UnexpectedCallback {
        expected,
        actual: event.callback_type().to_string(),
    }
}

fn ensure(
    check: &'static str,
    condition: bool,
    detail: impl FnOnce() -> String,
) -> Result<(), VerifyError> {
    if condition {
        Ok(())
    } else {
        Err(VerifyError::Conformance {
            check,
            detail: detail(),
        })
    }
}

/// Checks shared by every status fragment: identity of the request, the
/// non-decreasing status walk, terminal-flag monotonicity, and the height
/// policy.
fn verify_common(
    flow: &RequestFlow,
    node_id: &str,
    snapshot: &RequestStatusSnapshot,
    expected_status: RequestStatus,
    height_policy: HeightPolicy,
) -> Result<shared_types::BlockHeight, VerifyError> {
    ensure("request_id", snapshot.request_id == flow.request_id(), || {
        format!("{}, expected {}", snapshot.request_id, flow.request_id())
    })?;
    ensure("mode", snapshot.mode == flow.params().mode, || {
        format!("mode {}, expected {}", snapshot.mode, flow.params().mode)
    })?;
    ensure("min_idp", snapshot.min_idp == flow.params().min_idp, || {
        format!("min_idp {}, expected {}", snapshot.min_idp, flow.params().min_idp)
    })?;
    ensure("status", snapshot.status == expected_status, || {
        format!("status {}, expected {expected_status}", snapshot.status)
    })?;

    if let Some(observer) = flow.observer(node_id) {
        if let Some(previous) = observer.last_status {
            ensure("status_walk", snapshot.status >= previous, || {
                format!("status {} after {previous}", snapshot.status)
            })?;
        }
        ensure(
            "closed_is_terminal",
            !observer.saw_closed || snapshot.closed,
            || "closed reverted to false".to_string(),
        )?;
        ensure(
            "timed_out_is_terminal",
            !observer.saw_timed_out || snapshot.timed_out,
            || "timed_out reverted to false".to_string(),
        )?;
    }

    let height = check_height_progress(
        flow.last_height(node_id),
        &snapshot.block_height,
        height_policy,
    )?;
    Ok(height)
}

/// `answered_idp_count`, its validity list length, membership in the
/// expected IdP set, and the per-role visibility of validity booleans.
fn verify_answered(
    flow: &RequestFlow,
    snapshot: &RequestStatusSnapshot,
    answered_idp_ids: &[String],
    observer_role: NodeRole,
) -> Result<(), VerifyError> {
    ensure(
        "answered_idp_count",
        snapshot.answered_idp_count as usize == answered_idp_ids.len(),
        || {
            format!(
                "answered_idp_count {}, expected {}",
                snapshot.answered_idp_count,
                answered_idp_ids.len()
            )
        },
    )?;
    ensure(
        "response_valid_list_length",
        snapshot.response_valid_list.len() == answered_idp_ids.len(),
        || {
            format!(
                "{} entries, expected {}",
                snapshot.response_valid_list.len(),
                answered_idp_ids.len()
            )
        },
    )?;

    for entry in &snapshot.response_valid_list {
        ensure(
            "response_valid_idp_membership",
            answered_idp_ids.contains(&entry.idp_id) && flow.idp_id_list().contains(&entry.idp_id),
            || format!("unexpected idp {}", entry.idp_id),
        )?;
        if observer_role.is_rp() {
            ensure(
                "rp_sees_validity",
                entry.valid_signature.is_some() && entry.valid_ial.is_some(),
                || format!("idp {} validity withheld from RP", entry.idp_id),
            )?;
        } else {
            ensure(
                "non_rp_validity_withheld",
                entry.valid_signature.is_none() && entry.valid_ial.is_none(),
                || format!("idp {} validity leaked to non-RP", entry.idp_id),
            )?;
        }
    }
    Ok(())
}

/// Snapshot `service_list` against the oracle: `min_as`, signed counts,
/// received counts when `check_received`, and the standing invariant
/// `received <= signed <= targeted AS count`.
fn verify_service_counts(
    flow: &RequestFlow,
    snapshot: &RequestStatusSnapshot,
    check_received: bool,
) -> Result<(), VerifyError> {
    let expected = flow.service_counts();
    ensure(
        "service_list_length",
        snapshot.service_list.len() == expected.len(),
        || {
            format!(
                "{} services, expected {}",
                snapshot.service_list.len(),
                expected.len()
            )
        },
    )?;

    for (service_id, counts) in &expected {
        let Some(entry) = snapshot
            .service_list
            .iter()
            .find(|s| &s.service_id == service_id)
        else {
            return Err(VerifyError::Conformance {
                check: "service_list_membership",
                detail: format!("service {service_id} missing from snapshot"),
            });
        };
        let oracle = flow
            .data_request_list()
            .iter()
            .find(|d| &d.service_id == service_id);

        ensure("signed_data_count", entry.signed_data_count == counts.signed, || {
            format!(
                "service {service_id} signed_data_count {}, expected {}",
                entry.signed_data_count, counts.signed
            )
        })?;
        if check_received {
            ensure(
                "received_data_count",
                entry.received_data_count == counts.received,
                || {
                    format!(
                        "service {service_id} received_data_count {}, expected {}",
                        entry.received_data_count, counts.received
                    )
                },
            )?;
        }
        ensure(
            "received_le_signed",
            entry.received_data_count <= entry.signed_data_count,
            || {
                format!(
                    "service {service_id} received {} > signed {}",
                    entry.received_data_count, entry.signed_data_count
                )
            },
        )?;
        if let Some(oracle) = oracle {
            ensure("min_as", entry.min_as == oracle.min_as, || {
                format!(
                    "service {service_id} min_as {}, expected {}",
                    entry.min_as, oracle.min_as
                )
            })?;
            if !oracle.as_id_list.is_empty() {
                ensure(
                    "signed_le_targeted",
                    entry.signed_data_count as usize <= oracle.as_id_list.len(),
                    || {
                        format!(
                            "service {service_id} signed {} > {} targeted AS nodes",
                            entry.signed_data_count,
                            oracle.as_id_list.len()
                        )
                    },
                )?;
            }
        }
    }
    Ok(())
}

fn record(
    flow: &mut RequestFlow,
    node_id: &str,
    snapshot: &RequestStatusSnapshot,
    height: shared_types::BlockHeight,
) {
    debug!(
        node_id = node_id,
        request_id = snapshot.request_id,
        status = %snapshot.status,
        closed = snapshot.closed,
        block_height = %snapshot.block_height,
        "Status snapshot verified"
    );
    flow.record_observation(
        node_id,
        height,
        snapshot.status,
        snapshot.closed,
        snapshot.timed_out,
    );
}
