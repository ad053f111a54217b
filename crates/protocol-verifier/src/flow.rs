//! # Request Flow
//!
//! Scenario-scoped oracle for one request. Built once from the create
//! parameters plus the values the API echoed back, then mutated in
//! lock-step with AS actions as the scenario progresses.

use flow_model::{
    create_data_request_list, create_idp_id_list, create_request_message_hash,
    expected_service_counts, set_data_received, set_data_signed, CreateRequestParams,
    DataRequestEntry, EligibleIdp, ServiceCounts,
};
use shared_types::{BlockHeight, HarnessError, RequestStatus};
use std::collections::HashMap;

/// What one node has observed about the request so far.
#[derive(Debug, Clone)]
pub(crate) struct ObserverState {
    pub last_height: BlockHeight,
    pub last_status: Option<RequestStatus>,
    pub saw_closed: bool,
    pub saw_timed_out: bool,
    pub status_updates: u32,
}

/// The oracle for one protocol run.
pub struct RequestFlow {
    params: CreateRequestParams,
    request_id: String,
    request_message_hash: String,
    idp_id_list: Vec<String>,
    data_request_list: Vec<DataRequestEntry>,
    creation_block_height: BlockHeight,
    observers: HashMap<String, ObserverState>,
}

impl RequestFlow {
    /// Build the oracle.
    ///
    /// `initial_salt` and `creation_block_height` are the values echoed by
    /// the create-request call and its result callback; `eligible` is the
    /// platform's enumeration of IdPs for the requested identity.
    pub fn new(
        params: CreateRequestParams,
        request_id: impl Into<String>,
        initial_salt: &str,
        creation_block_height: &str,
        eligible: &[EligibleIdp],
    ) -> Result<Self, HarnessError> {
        let request_id = request_id.into();
        let idp_id_list = create_idp_id_list(&params, eligible);
        let data_request_list = create_data_request_list(&params, &request_id, initial_salt);
        let request_message_hash =
            create_request_message_hash(&params.request_message, initial_salt);
        let creation_block_height = BlockHeight::parse(creation_block_height)?;

        Ok(Self {
            params,
            request_id,
            request_message_hash,
            idp_id_list,
            data_request_list,
            creation_block_height,
            observers: HashMap::new(),
        })
    }

    /// The create parameters the RP supplied.
    #[must_use]
    pub fn params(&self) -> &CreateRequestParams {
        &self.params
    }

    /// Platform-assigned request id.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Expected `request_message_hash` in `incoming_request` callbacks.
    #[must_use]
    pub fn request_message_hash(&self) -> &str {
        &self.request_message_hash
    }

    /// Expected ordered list of eligible IdPs.
    #[must_use]
    pub fn idp_id_list(&self) -> &[String] {
        &self.idp_id_list
    }

    /// Current per-service descriptors.
    #[must_use]
    pub fn data_request_list(&self) -> &[DataRequestEntry] {
        &self.data_request_list
    }

    /// Height at which the request hit the chain; the minimum of every
    /// height any observer may ever report for it.
    #[must_use]
    pub fn creation_block_height(&self) -> &BlockHeight {
        &self.creation_block_height
    }

    /// Expected `(signed, received)` counts for the next snapshot.
    #[must_use]
    pub fn service_counts(&self) -> Vec<(String, ServiceCounts)> {
        expected_service_counts(&self.data_request_list)
    }

    /// An AS signed its response on chain.
    pub fn record_data_signed(&mut self, service_id: &str, as_id: &str) {
        self.data_request_list = set_data_signed(&self.data_request_list, service_id, as_id);
    }

    /// The RP received an AS's data item.
    pub fn record_data_received(&mut self, service_id: &str, as_id: &str) {
        self.data_request_list = set_data_received(&self.data_request_list, service_id, as_id);
    }

    /// Number of `request_status` updates `node_id` has been verified for.
    #[must_use]
    pub fn status_update_count(&self, node_id: &str) -> u32 {
        self.observers
            .get(node_id)
            .map_or(0, |state| state.status_updates)
    }

    /// Last verified height for `node_id`, falling back to the creation
    /// height for a first observation.
    #[must_use]
    pub fn last_height(&self, node_id: &str) -> &BlockHeight {
        self.observers
            .get(node_id)
            .map_or(&self.creation_block_height, |state| &state.last_height)
    }

    pub(crate) fn observer(&self, node_id: &str) -> Option<&ObserverState> {
        self.observers.get(node_id)
    }

    pub(crate) fn record_observation(
        &mut self,
        node_id: &str,
        height: BlockHeight,
        status: RequestStatus,
        closed: bool,
        timed_out: bool,
    ) {
        let state = self
            .observers
            .entry(node_id.to_string())
            .or_insert_with(|| ObserverState {
                last_height: self.creation_block_height.clone(),
                last_status: None,
                saw_closed: false,
                saw_timed_out: false,
                status_updates: 0,
            });
        state.last_height = height;
        state.last_status = Some(status);
        state.saw_closed |= closed;
        state.saw_timed_out |= timed_out;
        state.status_updates += 1;
    }
}
