//! Router tests driven through `tower::ServiceExt::oneshot` against the
//! in-memory `MockSequenceStore`, so no Postgres is needed.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use db::{MockSequenceStore, SequenceStore};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use service::SequenceService;
use tower::ServiceExt;

use super::*;
use crate::auth::Claims;
use crate::requests::{SequenceResponse, StepResponse};

struct TestApp {
    router: Router,
    store: Arc<MockSequenceStore>,
    metrics: Arc<RequestMetrics>,
}

fn test_app_with(store: MockSequenceStore, jwt: Option<JwtAuth>) -> TestApp {
    let store = Arc::new(store);
    let metrics = Arc::new(RequestMetrics::new().expect("metrics"));
    let state = AppState {
        service: SequenceService::new(store.clone()),
        metrics: metrics.clone(),
    };
    TestApp {
        router: app_router(state, jwt),
        store,
        metrics,
    }
}

fn test_app() -> TestApp {
    test_app_with(MockSequenceStore::new(), None)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

fn create_body() -> Value {
    json!({
        "account_id": 1,
        "sequence_name": "Test",
        "sequence_open_tracking_enabled": true,
        "sequence_click_tracking_enabled": true,
        "steps": [{
            "step_email_subject": "S1",
            "step_email_body": "B1",
            "wait_days": 1,
            "eligible_start_time": 1706132001,
            "eligible_end_time": 1706304801
        }]
    })
}

async fn create_sequence(router: &Router) -> i64 {
    let response = router
        .clone()
        .oneshot(json_request(Method::POST, "/v1/sequence", create_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let created: SequenceResponse =
        serde_json::from_slice(&body_bytes(response).await).expect("json");
    created.sequence_id
}

fn token(secret: &str, exp: u64) -> String {
    sign(
        secret,
        &Claims {
            username: "tester".into(),
            exp: Some(exp),
        },
    )
}

fn sign(secret: &str, claims: &impl serde::Serialize) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token")
}

fn bearer(request: &mut Request<Body>, token: &str) {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().expect("header"),
    );
}

fn one_hour_from_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_secs()
        + 3600
}

// ============================================================
// POST /v1/sequence
// ============================================================

#[tokio::test]
async fn create_sequence_returns_id_and_ok_status() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request(Method::POST, "/v1/sequence", create_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert_eq!(body, json!({ "sequence_id": 1, "status": "ok" }));
    assert_eq!(app.store.step_count(), 1);
}

#[tokio::test]
async fn create_sequence_with_invalid_payload_is_400_and_stores_nothing() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/sequence",
            json!({ "account_id": 0, "sequence_name": "" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_bytes(response).await, b"Invalid request");
    assert_eq!(app.store.sequence_count(), 0);
}

#[tokio::test]
async fn undecodable_body_is_400() {
    let app = test_app();
    let request = Request::post("/v1/sequence")
        .body(Body::from("not json"))
        .expect("request");

    let response = app.router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_outage_is_500() {
    let app = test_app_with(MockSequenceStore::unavailable(), None);

    let response = app
        .router
        .oneshot(json_request(Method::POST, "/v1/sequence", create_body()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, b"An error occurred");
}

// ============================================================
// PUT /v1/sequence
// ============================================================

#[tokio::test]
async fn update_sequence_sets_tracking_flags() {
    let app = test_app();
    let sequence_id = create_sequence(&app.router).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/v1/sequence",
            json!({
                "account_id": 1,
                "sequence_id": sequence_id,
                "sequence_open_tracking_enabled": false,
                "sequence_click_tracking_enabled": false
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let row = app.store.get_sequence(1, sequence_id).await.expect("row");
    assert!(!row.sequence_open_tracking_enabled);
    assert!(!row.sequence_click_tracking_enabled);
}

#[tokio::test]
async fn update_sequence_without_flags_is_400() {
    let app = test_app();
    let sequence_id = create_sequence(&app.router).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/v1/sequence",
            json!({ "account_id": 1, "sequence_id": sequence_id }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================
// PUT /v1/step, DELETE /v1/step
// ============================================================

#[tokio::test]
async fn update_step_returns_both_ids() {
    let app = test_app();
    let sequence_id = create_sequence(&app.router).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/v1/step",
            json!({
                "account_id": 1,
                "sequence_id": sequence_id,
                "step_id": 1,
                "step_email_subject": "Updated",
                "step_email_body": "Updated"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body: StepResponse = serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert_eq!(
        body,
        StepResponse {
            sequence_id,
            step_id: 1,
            status: "ok".into()
        }
    );

    let steps = app.store.list_steps(1, sequence_id).await.expect("steps");
    assert_eq!(steps[0].step_email_subject, "Updated");
}

#[tokio::test]
async fn not_found_collapses_to_500() {
    let app = test_app();
    let sequence_id = create_sequence(&app.router).await;
    let delete = json!({ "account_id": 1, "sequence_id": sequence_id, "step_id": 1 });

    let first = app
        .router
        .clone()
        .oneshot(json_request(Method::DELETE, "/v1/step", delete.clone()))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .router
        .clone()
        .oneshot(json_request(Method::DELETE, "/v1/step", delete))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.store.step_count(), 0);
}

#[tokio::test]
async fn delete_step_for_other_account_leaves_step_in_place() {
    let app = test_app();
    let sequence_id = create_sequence(&app.router).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            "/v1/step",
            json!({ "account_id": 2, "sequence_id": sequence_id, "step_id": 1 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.store.step_count(), 1);
}

// ============================================================
// Metrics
// ============================================================

#[tokio::test]
async fn v1_requests_are_counted_per_path() {
    let app = test_app();
    create_sequence(&app.router).await;
    create_sequence(&app.router).await;
    app.router
        .clone()
        .oneshot(json_request(Method::DELETE, "/v1/step", json!({})))
        .await
        .expect("response");

    assert_eq!(app.metrics.request_count("/v1/sequence"), 2);
    assert_eq!(app.metrics.request_count("/v1/step"), 1);

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).expect("utf8");
    assert!(text.contains("http_requests_total{path=\"/v1/sequence\"} 2"));
    assert!(text.contains("http_request_duration_seconds_count{path=\"/v1/step\"} 1"));
    assert!(!text.contains("path=\"/metrics\""));
}

// ============================================================
// JWT gate
// ============================================================

#[tokio::test]
async fn jwt_gate_rejects_missing_and_invalid_tokens() {
    let app = test_app_with(MockSequenceStore::new(), Some(JwtAuth::hs256("secret")));

    let missing = app
        .router
        .clone()
        .oneshot(json_request(Method::POST, "/v1/sequence", create_body()))
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);

    let mut wrong_key = json_request(Method::POST, "/v1/sequence", create_body());
    wrong_key.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token("other", one_hour_from_now()))
            .parse()
            .expect("header"),
    );
    let rejected = app.router.clone().oneshot(wrong_key).await.expect("response");
    assert_eq!(rejected.status(), StatusCode::FORBIDDEN);

    let mut expired = json_request(Method::POST, "/v1/sequence", create_body());
    expired.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token("secret", 1)).parse().expect("header"),
    );
    let rejected = app.router.clone().oneshot(expired).await.expect("response");
    assert_eq!(rejected.status(), StatusCode::FORBIDDEN);

    assert_eq!(app.store.sequence_count(), 0);
}

#[tokio::test]
async fn jwt_gate_accepts_valid_token() {
    let app = test_app_with(MockSequenceStore::new(), Some(JwtAuth::hs256("secret")));

    let mut request = json_request(Method::POST, "/v1/sequence", create_body());
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token("secret", one_hour_from_now()))
            .parse()
            .expect("header"),
    );

    let response = app.router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.sequence_count(), 1);
}

#[tokio::test]
async fn jwt_gate_accepts_token_without_expiry() {
    let app = test_app_with(MockSequenceStore::new(), Some(JwtAuth::hs256("secret")));

    let mut request = json_request(Method::POST, "/v1/sequence", create_body());
    bearer(&mut request, &sign("secret", &json!({ "username": "tester" })));
    let response = app.router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let mut request = json_request(Method::POST, "/v1/sequence", create_body());
    bearer(&mut request, &sign("other", &json!({ "username": "tester" })));
    let response = app.router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let mut request = json_request(Method::POST, "/v1/sequence", create_body());
    bearer(&mut request, &token("secret", 1));
    let response = app.router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert_eq!(app.store.sequence_count(), 1);
}

// ============================================================
// Health
// ============================================================

#[tokio::test]
async fn health_reports_ok_when_store_is_reachable() {
    let router = health_router(Arc::new(MockSequenceStore::new()));

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn health_reports_500_when_store_is_down() {
    let router = health_router(Arc::new(MockSequenceStore::unavailable()));

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
