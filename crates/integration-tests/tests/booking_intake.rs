//! Endpoint-contract tests for `/api/send-email`, driven through the
//! assembled router with a recording mail transport.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use mkm_integration_tests::{
    MKM_INBOX, PIZZA_INBOX, RecordingMailer, test_app, valid_payload,
};
use mkm_site::services::mailer::MailError;
use serde_json::{Value, json};
use tower::ServiceExt;

/// POST a JSON payload, optionally tagged with a forwarded-for address.
async fn post(app: &Router, payload: &Value, forwarded_for: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/send-email")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", forwarded_for)
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_get_probe_reports_route_and_version() {
    let app = test_app(RecordingMailer::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/send-email")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["route"], json!("/api/send-email"));
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_options_preflight_is_empty_success() {
    let app = test_app(RecordingMailer::new());

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/send-email")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_unknown_method_is_405_with_json_error() {
    let app = test_app(RecordingMailer::new());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/send-email")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], json!("Method not allowed"));
}

#[tokio::test]
async fn test_pizza_booking_routes_to_both_inboxes() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    let (status, body) = post(&app, &valid_payload(), "203.0.113.1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["to"], json!([MKM_INBOX, PIZZA_INBOX]));
    assert_eq!(body["id"], json!("test-message-id"));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let to: Vec<&str> = sent[0].to.iter().map(AsRef::as_ref).collect();
    assert_eq!(to, vec![MKM_INBOX, PIZZA_INBOX]);
    assert_eq!(
        sent[0].reply_to.as_ref().map(AsRef::as_ref),
        Some("jo@example.com")
    );
    assert!(sent[0].from.starts_with("MKM Website <"));
}

#[tokio::test]
async fn test_external_booking_routes_to_mkm_only() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    let mut payload = valid_payload();
    payload["bookingType"] = json!("External");

    let (status, body) = post(&app, &payload, "203.0.113.2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["to"], json!([MKM_INBOX]));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.len(), 1);
}

#[tokio::test]
async fn test_booking_type_comparison_ignores_case_and_padding() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    let mut payload = valid_payload();
    payload["bookingType"] = json!("  pizza   RECORDS ");

    let (status, body) = post(&app, &payload, "203.0.113.3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["to"], json!([MKM_INBOX, PIZZA_INBOX]));
}

#[tokio::test]
async fn test_honeypot_is_400_and_dispatches_nothing() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    let mut payload = valid_payload();
    payload["company"] = json!("AcmeBot");

    let (status, body) = post(&app, &payload, "203.0.113.4").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], json!("Invalid submission"));
    assert!(body["details"]["honeypot"].is_string());
    // The spam short-circuit must reveal nothing about the other rules.
    assert_eq!(body["details"].as_object().unwrap().len(), 1);
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_short_message_is_422_with_field_detail() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    let mut payload = valid_payload();
    payload["message"] = json!("too short");

    let (status, body) = post(&app, &payload, "203.0.113.5").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], json!("Invalid submission"));
    assert!(body["details"]["message"].is_string());
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_message_length_boundary() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    let mut payload = valid_payload();
    payload["message"] = json!("a".repeat(19));
    let (status, _) = post(&app, &payload, "203.0.113.6").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    payload["message"] = json!("a".repeat(20));
    let (status, _) = post(&app, &payload, "203.0.113.7").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(mailer.sent_count(), 1);
}

#[tokio::test]
async fn test_link_count_boundary() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    let mut payload = valid_payload();
    payload["message"] = json!(format!("event details {}", "http://a.com ".repeat(5)));
    let (status, _) = post(&app, &payload, "203.0.113.8").await;
    assert_eq!(status, StatusCode::OK);

    payload["message"] = json!(format!("event details {}", "http://a.com ".repeat(6)));
    let (status, body) = post(&app, &payload, "203.0.113.9").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["message"].is_string());
}

#[tokio::test]
async fn test_rapid_resubmission_is_rate_limited() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());
    let payload = valid_payload();

    let (status, _) = post(&app, &payload, "203.0.113.10").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&app, &payload, "203.0.113.10").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], json!("Too many requests. Try again shortly."));

    // A denied attempt must not reopen or extend the window.
    let (status, _) = post(&app, &payload, "203.0.113.10").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(mailer.sent_count(), 1);
}

#[tokio::test]
async fn test_rate_limit_is_per_caller_address() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());
    let payload = valid_payload();

    let (status, _) = post(&app, &payload, "203.0.113.11").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(&app, &payload, "198.51.100.11").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(mailer.sent_count(), 2);
}

#[tokio::test]
async fn test_rejected_submission_never_reaches_the_rate_limiter() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    // A validation failure burns nothing: the same address can submit a
    // corrected payload immediately.
    let mut bad = valid_payload();
    bad["message"] = json!("too short");
    let (status, _) = post(&app, &bad, "203.0.113.12").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post(&app, &valid_payload(), "203.0.113.12").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_json_is_500_server_error() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/send-email")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], json!("Server error"));
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_provider_error_is_502_with_details() {
    let provider_error = json!({"statusCode": 422, "name": "validation_error"});
    let mailer = RecordingMailer::failing_with(MailError::Provider(provider_error.clone()));
    let app = test_app(mailer);

    let (status, body) = post(&app, &valid_payload(), "203.0.113.13").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], json!("Email send failed"));
    assert_eq!(body["details"], provider_error);
}

#[tokio::test]
async fn test_transport_failure_is_500() {
    let mailer = RecordingMailer::failing_with(MailError::Transport("connection reset".to_owned()));
    let app = test_app(mailer);

    let (status, body) = post(&app, &valid_payload(), "203.0.113.14").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Server error"));
}

#[tokio::test]
async fn test_email_body_carries_the_booking_block() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    let mut payload = valid_payload();
    payload["bookingType"] = json!("External");
    payload["selectedService"] = json!("External – Full PA");
    payload["addOns"] = json!(["Standard Lighting — $50", "Projected Visuals — $150"]);
    payload["date"] = json!("2026-09-12");
    payload["phone"] = json!("555-0100");

    let (status, _) = post(&app, &payload, "203.0.113.15").await;
    assert_eq!(status, StatusCode::OK);

    let sent = mailer.sent();
    let text = &sent[0].text;
    assert!(text.starts_with("Booking Type: External\n"));
    assert!(text.contains("Selected Service: External – Full PA\n"));
    assert!(text.contains("Add-Ons: Standard Lighting — $50, Projected Visuals — $150\n"));
    assert!(text.contains("Event Date: 2026-09-12\n"));
    assert!(text.contains("From: Jo Lee\n"));
    assert!(text.contains("Phone: 555-0100\n"));
    assert!(text.ends_with("Message:\nWe'd like a DJ set for our anniversary party please"));
    assert_eq!(
        sent[0].subject,
        "[External] External – Full PA — Booking Request"
    );
}

#[tokio::test]
async fn test_caller_subject_override_wins() {
    let mailer = RecordingMailer::new();
    let app = test_app(mailer.clone());

    let mut payload = valid_payload();
    payload["subject"] = json!("Band inquiry for October");

    let (status, _) = post(&app, &payload, "203.0.113.16").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mailer.sent()[0].subject, "Band inquiry for October");
}

#[tokio::test]
async fn test_responses_carry_cors_and_no_store_headers() {
    let app = test_app(RecordingMailer::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/send-email")
                .header(header::ORIGIN, "https://mkmentertainmentllc.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
        Some("no-store, max-age=0")
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(RecordingMailer::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
