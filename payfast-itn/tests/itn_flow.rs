//! End-to-end tests for the ITN endpoint.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; Payfast
//! and the form relay are stood in for by wiremock servers whose call counts
//! are verified when each server is dropped.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use url::form_urlencoded;
use wiremock::{
    matchers::{body_partial_json, body_string, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use payfast_itn::web::ITN_PATH;
use payfast_itn::{build_router, generate_signature, AppState, Config, Notification};

const PASSPHRASE: &str = "Onksyeoh12jdikla";
const VALIDATE_PATH: &str = "/eng/query/validate";
const RELAY_PATH: &str = "/f/mblzwyby";

fn config(provider: &MockServer, relay: &MockServer, passphrase: Option<&str>) -> Config {
    Config {
        passphrase: passphrase.map(str::to_string),
        relay_endpoint: Some(format!("{}{}", relay.uri(), RELAY_PATH)),
        site_base_url: Some("https://example.com".to_string()),
        merchant_id: "10000100".to_string(),
        merchant_key: "46f0cd694581a".to_string(),
        sandbox: true,
        validate_url: format!("{}{}", provider.uri(), VALIDATE_PATH),
        subject_prefix: "New Application".to_string(),
        request_timeout_ms: Some(5_000),
        port: 0,
    }
}

fn fields(reference: &str, status: &str) -> Vec<(&'static str, String)> {
    vec![
        ("m_payment_id", "01AB".to_string()),
        ("pf_payment_id", "1089250".to_string()),
        ("payment_status", status.to_string()),
        ("item_name", "Enrollment Fee".to_string()),
        ("amount_gross", "200.00".to_string()),
        ("amount_fee", "-4.60".to_string()),
        ("amount_net", "195.40".to_string()),
        ("custom_str1", reference.to_string()),
        ("custom_int1", String::new()),
        ("name_first", "Thandi".to_string()),
        ("name_last", "Mokoena".to_string()),
        ("email_address", "thandi@example.com".to_string()),
        ("merchant_id", "10000100".to_string()),
    ]
}

fn signature_for(fields: &[(&'static str, String)], passphrase: &str) -> String {
    let notification: Notification = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    generate_signature(&notification, Some(passphrase))
}

fn encode(fields: &[(&'static str, String)], signature: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, v) in fields {
        serializer.append_pair(k, v);
    }
    serializer.append_pair("signature", signature);
    serializer.finish()
}

fn signed_body(reference: &str, status: &str) -> String {
    let fields = fields(reference, status);
    let signature = signature_for(&fields, PASSPHRASE);
    encode(&fields, &signature)
}

async fn post_itn(config: Config, body: String) -> (StatusCode, Value) {
    let app = build_router(AppState::new(config).expect("build state"));

    let request = Request::builder()
        .method("POST")
        .uri(ITN_PATH)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("build request");

    let response = app.oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload: Value = serde_json::from_slice(&bytes).expect("deserialize response");
    (status, payload)
}

async fn mount_provider(server: &MockServer, body: &str, reply: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(VALIDATE_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(body))
        .respond_with(ResponseTemplate::new(200).set_body_string(reply))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_provider_never_called(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(VALIDATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("VALID"))
        .expect(0)
        .mount(server)
        .await;
}

async fn mount_relay(server: &MockServer, status: u16, times: u64) {
    Mock::given(method("POST"))
        .and(path(RELAY_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "ok": status < 300 })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_complete_payment_is_validated_and_relayed() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;
    let body = signed_body("REF1", "COMPLETE");

    mount_provider(&provider, &body, "VALID", 1).await;
    Mock::given(method("POST"))
        .and(path(RELAY_PATH))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "_subject": "New Application (Payment Confirmed - Ref: REF1)",
            "Transaction Status": "COMPLETE",
            "Email": "thandi@example.com",
            "First Name": "Thandi",
            "Last Name": "Mokoena",
            "Application Reference ID": "REF1",
            "Amount Paid": "-4.60",
            "Payfast Transaction ID": "1089250",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&relay)
        .await;

    let (status, payload) = post_itn(config(&provider, &relay, Some(PASSPHRASE)), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "processed");
    assert_eq!(payload["reference"], "REF1");
}

#[tokio::test]
async fn test_relayed_confirmation_time_is_iso8601() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;
    let body = signed_body("REF7", "COMPLETE");

    mount_provider(&provider, &body, "VALID", 1).await;
    mount_relay(&relay, 200, 1).await;

    let (status, _) = post_itn(config(&provider, &relay, Some(PASSPHRASE)), body).await;
    assert_eq!(status, StatusCode::OK);

    let requests = relay.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let sent: Value = serde_json::from_slice(&requests[0].body).expect("relay body is JSON");
    let time = sent["Confirmation Time"].as_str().expect("timestamp present");
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
    assert!(time.ends_with('Z'));
}

#[tokio::test]
async fn test_tampered_amount_rejected_without_outbound_calls() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;
    mount_provider_never_called(&provider).await;
    mount_relay(&relay, 200, 0).await;

    let original = fields("REF2", "COMPLETE");
    let signature = signature_for(&original, PASSPHRASE);
    let tampered: Vec<_> = original
        .into_iter()
        .map(|(k, v)| if k == "amount_fee" { (k, "-0.01".to_string()) } else { (k, v) })
        .collect();

    let (status, payload) = post_itn(
        config(&provider, &relay, Some(PASSPHRASE)),
        encode(&tampered, &signature),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["status"], "signature_mismatch");
    assert!(provider.received_requests().await.unwrap().is_empty());
    assert!(relay.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pending_payment_acknowledged_without_outbound_calls() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;
    mount_provider_never_called(&provider).await;
    mount_relay(&relay, 200, 0).await;

    let (status, payload) = post_itn(
        config(&provider, &relay, Some(PASSPHRASE)),
        signed_body("REF3", "PENDING"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "acknowledged");
    assert!(provider.received_requests().await.unwrap().is_empty());
    assert!(relay.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_invalid_response_rejected_and_relay_skipped() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;
    let body = signed_body("REF4", "COMPLETE");

    mount_provider(&provider, &body, "INVALID", 1).await;
    mount_relay(&relay, 200, 0).await;

    let (status, payload) = post_itn(config(&provider, &relay, Some(PASSPHRASE)), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["status"], "validation_failed");
}

#[tokio::test]
async fn test_provider_reply_must_match_exactly() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;
    let body = signed_body("REF4", "COMPLETE");

    mount_provider(&provider, &body, "VALID\n", 1).await;
    mount_relay(&relay, 200, 0).await;

    let (status, _) = post_itn(config(&provider, &relay, Some(PASSPHRASE)), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_relay_rejection_is_server_error() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;
    let body = signed_body("REF5", "COMPLETE");

    mount_provider(&provider, &body, "VALID", 1).await;
    mount_relay(&relay, 422, 1).await;

    let (status, payload) = post_itn(config(&provider, &relay, Some(PASSPHRASE)), body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload["status"], "relay_failed");
}

#[tokio::test]
async fn test_unreachable_provider_is_server_error() {
    let relay = MockServer::start().await;
    mount_relay(&relay, 200, 0).await;

    let provider = MockServer::start().await;
    let mut config = config(&provider, &relay, Some(PASSPHRASE));
    config.validate_url = "http://127.0.0.1:9/eng/query/validate".to_string();

    let (status, payload) = post_itn(config, signed_body("REF6", "COMPLETE")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload["status"], "validation_error");
}

#[tokio::test]
async fn test_missing_passphrase_rejected() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;
    mount_provider_never_called(&provider).await;
    mount_relay(&relay, 200, 0).await;

    let (status, payload) =
        post_itn(config(&provider, &relay, None), signed_body("REF1", "COMPLETE")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["status"], "configuration_missing");
}

#[tokio::test]
async fn test_missing_reference_rejected() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;

    let (status, payload) = post_itn(
        config(&provider, &relay, Some(PASSPHRASE)),
        signed_body("", "COMPLETE"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["status"], "malformed_request");
}

#[tokio::test]
async fn test_non_post_method_not_allowed() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;
    let app = build_router(AppState::new(config(&provider, &relay, Some(PASSPHRASE))).unwrap());

    let request = Request::builder()
        .method("GET")
        .uri(ITN_PATH)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;
    let app = build_router(AppState::new(config(&provider, &relay, Some(PASSPHRASE))).unwrap());

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(payload, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_state_reports_relay_configuration() {
    let provider = MockServer::start().await;
    let relay = MockServer::start().await;

    let configured = AppState::new(config(&provider, &relay, Some(PASSPHRASE))).unwrap();
    assert!(configured.relay.is_configured());

    let mut missing = config(&provider, &relay, Some(PASSPHRASE));
    missing.relay_endpoint = None;
    let unconfigured = AppState::new(missing).unwrap();
    assert!(!unconfigured.relay.is_configured());
}
