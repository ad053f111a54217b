//! # Registry and Ingestion Semantics
//!
//! The delivery contract end to end: node scoping, drop-not-buffer,
//! duplicate keys, error fan-in, and the two side channels through the
//! real webhook router.

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use callback_bus::{callback_router, AccessorSigner, RegistryError};
    use protocol_verifier::TestContext;
    use shared_types::{errors::codes, CallbackData, CallbackType, NodeRole};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const SHORT: Duration = Duration::from_millis(50);

    fn test_context() -> TestContext {
        let signer: Arc<dyn AccessorSigner> =
            Arc::new(|accessor_id: &str, hash: &str| format!("sig({accessor_id},{hash})"));
        let ctx = TestContext::new(signer);
        ctx.register_node("rp1", NodeRole::Rp);
        ctx.register_node("idp1", NodeRole::Idp);
        ctx
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Correlation keys are scenario-unique, so two runs sharing idp1 never
    /// cross-talk even for the same callback type.
    #[tokio::test]
    async fn test_scenarios_sharing_a_node_do_not_cross_talk() {
        let ctx = test_context();
        let reference_a = ctx.generate_reference_id();
        let reference_b = ctx.generate_reference_id();

        let waiter_a = ctx.expect("idp1", CallbackType::ResponseResult, reference_a.as_str());
        let waiter_b = ctx.expect("idp1", CallbackType::ResponseResult, reference_b.as_str());

        ctx.channel("idp1")
            .ingest(serde_json::json!({
                "type": "response_result",
                "success": true,
                "reference_id": reference_b,
                "request_id": "req-b"
            }))
            .unwrap();

        // Only run B resolves.
        let event = waiter_b.wait_for(SHORT).await.unwrap();
        assert_eq!(event.correlation_key().unwrap().as_str(), reference_b);
        assert!(matches!(
            waiter_a.wait_for(SHORT).await,
            Err(RegistryError::TimedOut(_))
        ));

        ctx.shutdown();
    }

    /// A webhook that arrives before anyone registered is acknowledged and
    /// dropped; registering afterwards does not replay it. The only
    /// diagnostic is the waiter's own timeout.
    #[tokio::test]
    async fn test_late_registration_loses_the_event() {
        let ctx = test_context();
        let reference = ctx.generate_reference_id();

        let resolved = ctx
            .channel("rp1")
            .ingest(serde_json::json!({
                "type": "create_request_result",
                "success": true,
                "reference_id": reference,
                "request_id": "req-1"
            }))
            .unwrap();
        assert_eq!(resolved, 0);

        let waiter = ctx.expect("rp1", CallbackType::CreateRequestResult, reference.as_str());
        assert!(matches!(
            waiter.wait_for(SHORT).await,
            Err(RegistryError::TimedOut(_))
        ));

        ctx.shutdown();
    }

    /// Through the router: an `error` webhook resolves both the generic
    /// error waiter and the type-specific waiter for the same action.
    #[tokio::test]
    async fn test_error_webhook_fans_in_to_both_waiters() {
        let ctx = test_context();
        let router = callback_router(ctx.ingest_state().clone());
        let reference = ctx.generate_reference_id();

        let generic = ctx.expect("idp1", CallbackType::Error, reference.as_str());
        let specific = ctx.expect("idp1", CallbackType::ResponseResult, reference.as_str());

        let response = router
            .oneshot(post_json(
                "/callback/idp1",
                serde_json::json!({
                    "type": "error",
                    "reference_id": reference,
                    "error": {
                        "code": codes::CONSENT_REJECTED,
                        "message": "Consent rejected"
                    }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let generic_event = generic.wait_for(SHORT).await.unwrap();
        let specific_event = specific.wait_for(SHORT).await.unwrap();
        assert_eq!(generic_event.error().unwrap().code, codes::CONSENT_REJECTED);
        assert_eq!(specific_event.error().unwrap().code, codes::CONSENT_REJECTED);

        ctx.shutdown();
    }

    /// Through the router: the accessor side channel answers synchronously
    /// with the signature while the main-stream observer still fires.
    #[tokio::test]
    async fn test_accessor_side_channel_round_trip() {
        let ctx = test_context();
        let router = callback_router(ctx.ingest_state().clone());
        let reference = ctx.generate_reference_id();

        let observer = ctx.expect("idp1", CallbackType::AccessorEncrypt, reference.as_str());

        let response = router
            .oneshot(post_json(
                "/accessor/idp1",
                serde_json::json!({
                    "type": "accessor_encrypt",
                    "accessor_id": "acc-1",
                    "key_type": "RSA",
                    "padding": "PKCS#1v1.5",
                    "reference_id": reference,
                    "request_message_padded_hash": "cGFkZGVkLWhhc2g="
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["signature"], "sig(acc-1,cGFkZGVkLWhhc2g=)");

        observer.wait_for(SHORT).await.unwrap();
        ctx.shutdown();
    }

    /// Identity onboarding end to end: `create_identity_result` resolves by
    /// the onboarding reference id and carries the platform-assigned
    /// reference group code; a later `add_accessor_result` for the same
    /// identity resolves by its own reference id.
    #[tokio::test]
    async fn test_identity_onboarding_results_resolve_by_reference() {
        let ctx = test_context();
        let onboard_reference = ctx.generate_reference_id();

        let onboarded = ctx.expect(
            "idp1",
            CallbackType::CreateIdentityResult,
            onboard_reference.as_str(),
        );
        ctx.channel("idp1")
            .ingest(serde_json::json!({
                "type": "create_identity_result",
                "success": true,
                "reference_id": onboard_reference,
                "reference_group_code": "rgc-100"
            }))
            .unwrap();

        let event = onboarded.wait_for(SHORT).await.unwrap();
        assert_eq!(event.callback_type(), CallbackType::CreateIdentityResult);
        let CallbackData::CreateIdentityResult {
            success,
            reference_group_code,
            ..
        } = &event.data
        else {
            panic!("unexpected payload: {:?}", event.data);
        };
        assert!(*success);
        assert_eq!(reference_group_code.as_deref(), Some("rgc-100"));

        let accessor_reference = ctx.generate_reference_id();
        let bound = ctx.expect(
            "idp1",
            CallbackType::AddAccessorResult,
            accessor_reference.as_str(),
        );
        ctx.channel("idp1")
            .ingest(serde_json::json!({
                "type": "add_accessor_result",
                "success": true,
                "reference_id": accessor_reference,
                "request_id": "req-consent-1"
            }))
            .unwrap();

        let event = bound.wait_for(SHORT).await.unwrap();
        assert!(event.error().is_none());
        assert_eq!(
            event.correlation_key().unwrap().as_str(),
            accessor_reference
        );

        ctx.shutdown();
    }

    /// Through the router: a group-scoped notification resolves the waiter
    /// keyed by `reference_group_code`, not by any reference id. This is how
    /// an IdP hosting a sibling accessor learns the identity changed.
    #[tokio::test]
    async fn test_identity_notification_keys_on_reference_group() {
        let ctx = test_context();
        ctx.register_node("idp2", NodeRole::Idp);
        let router = callback_router(ctx.ingest_state().clone());

        let watcher = ctx.expect(
            "idp2",
            CallbackType::IdentityModificationNotification,
            "rgc-100",
        );

        let response = router
            .oneshot(post_json(
                "/callback/idp2",
                serde_json::json!({
                    "type": "identity_modification_notification",
                    "reference_group_code": "rgc-100",
                    "action": "create_identity",
                    "actor_node_id": "idp1"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let event = watcher.wait_for(SHORT).await.unwrap();
        assert_eq!(event.correlation_key().unwrap().as_str(), "rgc-100");
        let CallbackData::IdentityModificationNotification {
            action,
            actor_node_id,
            ..
        } = &event.data
        else {
            panic!("unexpected payload: {:?}", event.data);
        };
        assert_eq!(action, "create_identity");
        assert_eq!(actor_node_id.as_deref(), Some("idp1"));

        ctx.shutdown();
    }

    /// Duplicate registrations for one key: each publish resolves exactly
    /// one, in unspecified order.
    #[tokio::test]
    async fn test_duplicate_registrations_drain_one_per_event() {
        let ctx = test_context();
        let reference = ctx.generate_reference_id();

        let first = ctx.expect("idp1", CallbackType::ResponseResult, reference.as_str());
        let second = ctx.expect("idp1", CallbackType::ResponseResult, reference.as_str());

        let body = serde_json::json!({
            "type": "response_result",
            "success": true,
            "reference_id": reference,
            "request_id": "req-1"
        });
        assert_eq!(ctx.channel("idp1").ingest(body.clone()).unwrap(), 1);
        assert_eq!(ctx.channel("idp1").ingest(body).unwrap(), 1);

        first.wait_for(SHORT).await.unwrap();
        second.wait_for(SHORT).await.unwrap();
        ctx.shutdown();
    }
}
