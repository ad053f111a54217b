//! # Per-Role Visibility
//!
//! The platform reports `valid_signature`/`valid_ial` booleans only to the
//! RP that created the request; IdP and AS observers of the same state see
//! `null` for both. Both views are checked concurrently, the way a real
//! run delivers them.

#[cfg(test)]
mod tests {
    use crate::common::platform::{SimulatedPlatform, SnapshotBuilder};
    use flow_model::{CreateRequestParams, DataRequestParams, EligibleIdp};
    use protocol_verifier::{
        receive_confirmed_request_status, receive_pending_request_status, HeightPolicy,
        RequestFlow, TestContext,
    };
    use shared_types::{CallbackType, NodeRole, RequestStatus};
    use std::sync::Arc;

    fn test_context() -> TestContext {
        let signer: Arc<dyn callback_bus::AccessorSigner> =
            Arc::new(|_: &str, hash: &str| format!("sig:{hash}"));
        let ctx = TestContext::new(signer);
        ctx.register_node("rp1", NodeRole::Rp);
        ctx.register_node("idp1", NodeRole::Idp);
        ctx.register_node("as1", NodeRole::As);
        ctx
    }

    fn params(reference_id: String) -> CreateRequestParams {
        CreateRequestParams {
            reference_id,
            mode: 3,
            namespace: "citizen_id".to_string(),
            identifier: "1234567890123".to_string(),
            idp_id_list: vec![],
            data_request_list: vec![DataRequestParams {
                service_id: "bank_statement".to_string(),
                as_id_list: vec!["as1".to_string()],
                min_as: 1,
                request_params: None,
            }],
            request_message: "visibility run".to_string(),
            min_ial: 2.3,
            min_aal: 3.0,
            min_idp: 1,
            request_timeout: 86400,
        }
    }

    fn eligible() -> Vec<EligibleIdp> {
        vec![EligibleIdp {
            node_id: "idp1".to_string(),
            max_ial: 3.0,
            max_aal: 3.0,
        }]
    }

    #[tokio::test]
    async fn test_rp_and_non_rp_views_of_the_same_confirm() {
        let ctx = test_context();
        let platform = SimulatedPlatform::new("test-chain", 600);
        let params = params(ctx.generate_reference_id());
        let created = platform.accept_create_request(&ctx, "rp1", &params);
        let answered = vec!["idp1".to_string()];

        // Each observer tracks its own walk through the lifecycle.
        let mut rp_flow = RequestFlow::new(
            params.clone(),
            created.request_id.clone(),
            &created.initial_salt,
            &created.creation_block_height,
            &eligible(),
        )
        .unwrap();
        let mut as_flow = RequestFlow::new(
            params.clone(),
            created.request_id.clone(),
            &created.initial_salt,
            &created.creation_block_height,
            &eligible(),
        )
        .unwrap();

        // Both observers see pending first.
        let rp_pending = ctx.expect("rp1", CallbackType::RequestStatus, created.request_id.as_str());
        let as_pending = ctx.expect("as1", CallbackType::RequestStatus, created.request_id.as_str());
        let pending_height = platform.next_height();
        platform.deliver_status(
            &ctx,
            "rp1",
            SnapshotBuilder::new(&created.request_id, RequestStatus::Pending, &pending_height)
                .service("bank_statement", 1, 0, 0)
                .build(),
        );
        platform.deliver_status(
            &ctx,
            "as1",
            SnapshotBuilder::new(&created.request_id, RequestStatus::Pending, &pending_height)
                .service("bank_statement", 1, 0, 0)
                .build(),
        );
        let (rp_outcome, as_outcome) = tokio::join!(
            receive_pending_request_status(&mut rp_flow, "rp1", rp_pending),
            receive_pending_request_status(&mut as_flow, "as1", as_pending),
        );
        rp_outcome.unwrap();
        as_outcome.unwrap();

        // The confirm transition: RP gets booleans, AS gets nulls.
        let rp_confirmed =
            ctx.expect("rp1", CallbackType::RequestStatus, created.request_id.as_str());
        let as_confirmed =
            ctx.expect("as1", CallbackType::RequestStatus, created.request_id.as_str());
        let confirm_height = platform.next_height();
        platform.deliver_status(
            &ctx,
            "rp1",
            SnapshotBuilder::new(&created.request_id, RequestStatus::Confirmed, &confirm_height)
                .answered("idp1", true)
                .service("bank_statement", 1, 0, 0)
                .build(),
        );
        platform.deliver_status(
            &ctx,
            "as1",
            SnapshotBuilder::new(&created.request_id, RequestStatus::Confirmed, &confirm_height)
                .answered("idp1", false)
                .service("bank_statement", 1, 0, 0)
                .build(),
        );

        let (rp_outcome, as_outcome) = tokio::join!(
            receive_confirmed_request_status(
                &mut rp_flow,
                "rp1",
                NodeRole::Rp,
                &answered,
                HeightPolicy::StrictlyAfter,
                rp_confirmed,
            ),
            receive_confirmed_request_status(
                &mut as_flow,
                "as1",
                NodeRole::As,
                &answered,
                HeightPolicy::StrictlyAfter,
                as_confirmed,
            ),
        );
        let rp_snapshot = rp_outcome.unwrap().into_verified().unwrap();
        let as_snapshot = as_outcome.unwrap().into_verified().unwrap();

        // Validity list lengths always equal the answered count.
        assert_eq!(
            rp_snapshot.response_valid_list.len(),
            rp_snapshot.answered_idp_count as usize
        );
        assert_eq!(
            as_snapshot.response_valid_list.len(),
            as_snapshot.answered_idp_count as usize
        );
        assert!(rp_snapshot.response_valid_list[0].valid_signature.is_some());
        assert!(as_snapshot.response_valid_list[0].valid_signature.is_none());

        ctx.shutdown();
    }
}
