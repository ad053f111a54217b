//! # API Surface
//!
//! The role endpoint wrappers against a real HTTP listener. A small axum
//! app plays the platform's versioned REST surface so the reqwest path,
//! URL shaping, and business-error extraction are exercised end to end.

#[cfg(test)]
mod tests {
    use api_client::{ApiConfig, NodeApi};
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use shared_types::errors::codes;

    /// Platform stand-in speaking the `v5` surface on an ephemeral port.
    async fn spawn_mock_platform() -> NodeApi {
        let app = Router::new()
            .route(
                "/v5/rp/requests/:namespace/:identifier",
                post(accept_create_request),
            )
            .route("/v5/idp/response", post(reject_timed_out_response))
            .route("/v5/as/data/:request_id/:service_id", post(reject_closed_data))
            .route("/v5/utility/requests/:request_id", get(terminal_snapshot));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        NodeApi::new(ApiConfig::new(format!("http://{addr}")))
    }

    async fn accept_create_request(
        Path((_namespace, _identifier)): Path<(String, String)>,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "request_id": "req-mock-1",
                "initial_salt": "c2FsdC1mcm9tLXBsYXRmb3Jt",
                "reference_id": body["reference_id"],
            })),
        )
    }

    async fn reject_timed_out_response(
        Json(_body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": {
                    "code": codes::REQUEST_ALREADY_TIMED_OUT,
                    "message": "Request is already timed out"
                }
            })),
        )
    }

    async fn reject_closed_data(
        Path((_request_id, _service_id)): Path<(String, String)>,
        Json(_body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": {
                    "code": codes::REQUEST_ALREADY_CLOSED,
                    "message": "Request is already closed"
                }
            })),
        )
    }

    async fn terminal_snapshot(Path(request_id): Path<String>) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "request_id": request_id,
            "mode": 3,
            "min_idp": 1,
            "closed": true,
            "timed_out": false,
            "status": "completed",
        }))
    }

    #[tokio::test]
    async fn test_create_request_echoes_salt_on_202() {
        let api = spawn_mock_platform().await;

        let body = serde_json::json!({
            "reference_id": "ref-create-1",
            "mode": 3,
            "min_idp": 1
        });
        let response = api_client::rp::create_request(&api, "citizen_id", "1234567890123", &body)
            .await
            .unwrap();

        assert_eq!(response.status, 202);
        assert!(response.is_accepted());
        assert_eq!(response.body_str("request_id"), Some("req-mock-1"));
        let salt = response.body_str("initial_salt").unwrap();
        assert!(!salt.is_empty());
        assert_eq!(response.body_str("reference_id"), Some("ref-create-1"));
        assert!(response.error().is_none());
    }

    /// A synchronous 400 is a regular outcome, not a transport error, and
    /// the business code is recoverable from the body.
    #[tokio::test]
    async fn test_late_idp_response_surfaces_business_code() {
        let api = spawn_mock_platform().await;

        let body = serde_json::json!({
            "request_id": "req-mock-1",
            "ial": 2.3,
            "aal": 3,
            "status": "accept"
        });
        let response = api_client::idp::create_response(&api, &body).await.unwrap();

        assert_eq!(response.status, 400);
        assert!(!response.is_accepted());
        assert_eq!(response.error_code(), Some(codes::REQUEST_ALREADY_TIMED_OUT));
    }

    #[tokio::test]
    async fn test_data_after_close_surfaces_business_code() {
        let api = spawn_mock_platform().await;

        let body = serde_json::json!({ "data": "opening-balance" });
        let response = api_client::as_service::send_data(&api, "req-mock-1", "bank_statement", &body)
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        assert_eq!(response.error_code(), Some(codes::REQUEST_ALREADY_CLOSED));
    }

    /// A closed request's snapshot never changes; two reads must agree
    /// byte for byte.
    #[tokio::test]
    async fn test_terminal_snapshot_is_idempotent() {
        let api = spawn_mock_platform().await;

        let first = api_client::utility::get_request(&api, "req-mock-1")
            .await
            .unwrap();
        let second = api_client::utility::get_request(&api, "req-mock-1")
            .await
            .unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(first.body["closed"], true);
        assert_eq!(first.body["status"], "completed");
        assert_eq!(first.body, second.body);
    }
}
