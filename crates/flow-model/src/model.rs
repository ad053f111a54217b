//! The oracle proper: expected IdP list, data-request descriptors, message
//! hash, and the monotonic signed/received mutators.

use crate::hash::hash_with_salt;
use crate::params::{CreateRequestParams, EligibleIdp};
use serde::{Deserialize, Serialize};
use shared_types::DataResponseEntry;

/// Expected per-service descriptor, compared against `data_request_list`
/// fields echoed in `incoming_request` and against `service_list` counts in
/// `request_status` snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRequestEntry {
    pub service_id: String,
    pub as_id_list: Vec<String>,
    pub min_as: u32,
    /// Salted hash of the service params; absent when the RP sent none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_params_hash: Option<String>,
    /// Per-AS progress, empty at creation.
    #[serde(default)]
    pub response_list: Vec<DataResponseEntry>,
}

/// Aggregate counts derived from a [`DataRequestEntry`]'s response list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceCounts {
    pub signed: u32,
    pub received: u32,
}

/// Ordered list of IdP node ids eligible to respond.
///
/// Platform enumeration order is preserved; an explicit `idp_id_list` in the
/// params restricts the set without reordering it. Eligibility is
/// `max_ial >= min_ial && max_aal >= min_aal`.
#[must_use]
pub fn create_idp_id_list(params: &CreateRequestParams, eligible: &[EligibleIdp]) -> Vec<String> {
    eligible
        .iter()
        .filter(|idp| idp.max_ial >= params.min_ial && idp.max_aal >= params.min_aal)
        .filter(|idp| {
            params.idp_id_list.is_empty() || params.idp_id_list.contains(&idp.node_id)
        })
        .map(|idp| idp.node_id.clone())
        .collect()
}

/// Expected data-request descriptors for a freshly created request.
///
/// `request_params_hash` is `sha256(request_params || request_id ||
/// initial_salt)` in the platform's base64 form; `initial_salt` is the value
/// echoed back by the create-request response.
#[must_use]
pub fn create_data_request_list(
    params: &CreateRequestParams,
    request_id: &str,
    initial_salt: &str,
) -> Vec<DataRequestEntry> {
    params
        .data_request_list
        .iter()
        .map(|service| DataRequestEntry {
            service_id: service.service_id.clone(),
            as_id_list: service.as_id_list.clone(),
            min_as: service.min_as,
            request_params_hash: service.request_params.as_ref().map(|request_params| {
                hash_with_salt(request_params, &format!("{request_id}{initial_salt}"))
            }),
            response_list: Vec::new(),
        })
        .collect()
}

/// The hash reported inside `incoming_request`, computed the way the
/// platform computes it so the comparison is byte-for-byte.
#[must_use]
pub fn create_request_message_hash(request_message: &str, initial_salt: &str) -> String {
    hash_with_salt(request_message, initial_salt)
}

/// Mark `as_id`'s response for `service_id` as signed on chain.
///
/// Returns an updated copy. The first response from an AS creates its
/// entry; an already-true flag stays true.
#[must_use]
pub fn set_data_signed(
    list: &[DataRequestEntry],
    service_id: &str,
    as_id: &str,
) -> Vec<DataRequestEntry> {
    update_response(list, service_id, as_id, |entry| entry.signed = true)
}

/// Mark `as_id`'s data for `service_id` as received by the RP.
#[must_use]
pub fn set_data_received(
    list: &[DataRequestEntry],
    service_id: &str,
    as_id: &str,
) -> Vec<DataRequestEntry> {
    update_response(list, service_id, as_id, |entry| entry.received = true)
}

/// Per-service `(signed, received)` counts expected in the next
/// `request_status` snapshot.
#[must_use]
pub fn expected_service_counts(list: &[DataRequestEntry]) -> Vec<(String, ServiceCounts)> {
    list.iter()
        .map(|service| {
            let signed = service.response_list.iter().filter(|r| r.signed).count() as u32;
            let received = service.response_list.iter().filter(|r| r.received).count() as u32;
            (service.service_id.clone(), ServiceCounts { signed, received })
        })
        .collect()
}

fn update_response(
    list: &[DataRequestEntry],
    service_id: &str,
    as_id: &str,
    apply: impl Fn(&mut DataResponseEntry),
) -> Vec<DataRequestEntry> {
    list.iter()
        .map(|service| {
            if service.service_id != service_id {
                return service.clone();
            }
            let mut updated = service.clone();
            match updated.response_list.iter_mut().find(|r| r.as_id == as_id) {
                Some(entry) => apply(entry),
                None => {
                    let mut entry = DataResponseEntry {
                        as_id: as_id.to_string(),
                        signed: false,
                        received: false,
                    };
                    apply(&mut entry);
                    updated.response_list.push(entry);
                }
            }
            updated
        })
        .collect()
}
