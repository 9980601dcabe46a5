//! HTTP tests for the wizard endpoints.

mod common;

use chrono::Duration;
use common::{contact_json, job_json, ApiClient, TEST_CREDENTIAL, TEST_PHONE};
use axum::http::StatusCode;
use serde_json::json;
use signup_core::common::FlowId;
use signup_core::kernel::test_dependencies::{MockAccountRegistry, TestDependencies};

fn flow_uri(flow_id: FlowId, suffix: &str) -> String {
    format!("/api/flows/{}{}", flow_id, suffix)
}

/// Mount and move a flow to `otp_pending`
async fn flow_at_otp(api: &ApiClient) -> FlowId {
    let flow_id = FlowId::new();
    assert_eq!(api.put(&flow_uri(flow_id, "")).await.status, StatusCode::OK);
    api.patch(&flow_uri(flow_id, "/job"), job_json()).await;
    api.post(&flow_uri(flow_id, "/advance"), json!({})).await;
    api.patch(&flow_uri(flow_id, "/contact"), contact_json(TEST_PHONE))
        .await;
    let response = api.post(&flow_uri(flow_id, "/advance"), json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.get("stage"), "otp_pending");
    flow_id
}

#[tokio::test]
async fn health_reports_memory_store() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);

    let response = api.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.get("status"), "healthy");
    assert_eq!(response.get("store.backend"), "memory");
}

#[tokio::test]
async fn mount_starts_at_job_details() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let flow_id = FlowId::new();

    let response = api.put(&flow_uri(flow_id, "")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.get("stage"), "job_details");
    assert_eq!(response.get("verified"), false);
    assert_eq!(api.state.flows.len(), 1);
}

#[tokio::test]
async fn unknown_flow_is_404() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);

    let response = api.get(&flow_uri(FlowId::new(), "")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.get("error"), "flow_not_found");
}

#[tokio::test]
async fn missing_field_is_422_with_field() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let flow_id = FlowId::new();
    api.put(&flow_uri(flow_id, "")).await;
    api.patch(&flow_uri(flow_id, "/job"), json!({ "service": "Plumbing" }))
        .await;

    let response = api.post(&flow_uri(flow_id, "/advance"), json!({})).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.get("error"), "missing_field");
    assert_eq!(response.get("field"), "postalCode");
}

#[tokio::test]
async fn full_flow_over_http() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let flow_id = flow_at_otp(&api).await;

    let code = deps.transport.last_code_for(TEST_PHONE).unwrap();
    let response = api
        .post(&flow_uri(flow_id, "/advance"), json!({ "otp_code": code }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.get("stage"), "credential_setup");
    assert_eq!(response.get("verified"), true);

    let response = api
        .post(
            &flow_uri(flow_id, "/advance"),
            json!({ "credential": TEST_CREDENTIAL }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.get("submitted"), true);
    assert_eq!(response.get("redirect"), "/?job=Plumbing&city=Oslo");
    assert_eq!(response.get("account.role"), "customer");

    // Completed flows are unmounted
    assert_eq!(
        api.get(&flow_uri(flow_id, "")).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn resend_during_cooldown_is_429() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let flow_id = flow_at_otp(&api).await;

    deps.clock.advance(Duration::seconds(30));
    let response = api.post(&flow_uri(flow_id, "/resend"), json!({})).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.get("error"), "cooldown_active");
    assert_eq!(response.get("retry_after_seconds"), 30);
    assert_eq!(response.retry_after.as_deref(), Some("30"));

    deps.clock.advance(Duration::seconds(31));
    let response = api.post(&flow_uri(flow_id, "/resend"), json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.get("resend_available_in_seconds"), 60);
}

#[tokio::test]
async fn wrong_code_is_400() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let flow_id = flow_at_otp(&api).await;

    let code = deps.transport.last_code_for(TEST_PHONE).unwrap();
    let wrong = if code == "123456" { "654321" } else { "123456" };
    let response = api
        .post(&flow_uri(flow_id, "/advance"), json!({ "otp_code": wrong }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.get("error"), "mismatch");
}

#[tokio::test]
async fn registration_rejection_message_is_passed_through() {
    let deps = TestDependencies::new()
        .mock_registry(MockAccountRegistry::new().with_rejection("Email already in use"));
    let api = ApiClient::new(&deps);
    let flow_id = flow_at_otp(&api).await;

    let code = deps.transport.last_code_for(TEST_PHONE).unwrap();
    api.post(&flow_uri(flow_id, "/advance"), json!({ "otp_code": code }))
        .await;
    let response = api
        .post(
            &flow_uri(flow_id, "/advance"),
            json!({ "credential": TEST_CREDENTIAL }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.get("error"), "registration_failed");
    assert_eq!(response.get("message"), "Email already in use");
}

#[tokio::test]
async fn back_navigation_and_invalid_target() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let flow_id = flow_at_otp(&api).await;

    let response = api
        .post(&flow_uri(flow_id, "/back"), json!({ "stage": "job_details" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.get("stage"), "job_details");
    assert_eq!(response.get("contact.phone"), TEST_PHONE);

    let response = api
        .post(
            &flow_uri(flow_id, "/back"),
            json!({ "stage": "credential_setup" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.get("error"), "invalid_back_target");
}

#[tokio::test]
async fn snapshot_never_exposes_code() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let flow_id = flow_at_otp(&api).await;
    let code = deps.transport.last_code_for(TEST_PHONE).unwrap();

    let response = api.get(&flow_uri(flow_id, "")).await;
    assert!(!response.body.to_string().contains(&format!("\"{}\"", code)));
    assert!(response.get("code_expires_at").is_string());
}

#[tokio::test]
async fn remount_restores_draft() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let flow_id = FlowId::new();
    api.put(&flow_uri(flow_id, "")).await;
    api.patch(&flow_uri(flow_id, "/job"), job_json()).await;

    let response = api.put(&flow_uri(flow_id, "")).await;
    assert_eq!(response.get("stage"), "job_details");
    assert_eq!(response.get("job.service"), "Plumbing");
    assert_eq!(response.get("job.postalCode"), "0150");
}

#[tokio::test]
async fn uploaded_attachment_is_listed_but_not_persisted() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let flow_id = FlowId::new();
    api.put(&flow_uri(flow_id, "")).await;

    let response = api
        .upload(
            &flow_uri(flow_id, "/attachments"),
            &[("x-file-name", "leak-photo.jpg"), ("content-type", "image/jpeg")],
            vec![0xff, 0xd8, 0xff, 0xe0],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.get("attachments.0.fileName"), "leak-photo.jpg");
    assert_eq!(response.get("attachments.0.contentType"), "image/jpeg");
    assert_eq!(response.get("attachments.0.size"), 4);

    api.patch(&flow_uri(flow_id, "/job"), job_json()).await;
    let response = api.put(&flow_uri(flow_id, "")).await;
    assert_eq!(response.get("job.service"), "Plumbing");
    assert_eq!(response.get("attachments"), json!([]));
}

#[tokio::test]
async fn attachment_after_job_details_is_409() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let flow_id = flow_at_otp(&api).await;

    let response = api
        .upload(&flow_uri(flow_id, "/attachments"), &[], b"late".to_vec())
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.get("error"), "wrong_stage");
}

#[tokio::test]
async fn abandoned_flow_is_evicted_after_idle_ttl() {
    let deps = TestDependencies::new();
    let api = ApiClient::new(&deps);
    let abandoned = FlowId::new();
    api.put(&flow_uri(abandoned, "")).await;
    api.patch(&flow_uri(abandoned, "/job"), job_json()).await;

    deps.clock.advance(Duration::hours(2));
    api.put(&flow_uri(FlowId::new(), "")).await;

    assert_eq!(api.state.flows.len(), 1);
    assert_eq!(
        api.get(&flow_uri(abandoned, "")).await.status,
        StatusCode::NOT_FOUND
    );

    // The draft outlives the eviction
    let response = api.put(&flow_uri(abandoned, "")).await;
    assert_eq!(response.get("job.service"), "Plumbing");
}
