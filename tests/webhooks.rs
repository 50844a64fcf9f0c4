//! Webhook signature verification and event processing tests.

#[path = "common/mod.rs"]
mod common;

use axum::{body::Body, http::Request, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;

// ============ Signature Verification ============

/// Get current Unix timestamp as a string (for webhook signature tests)
fn current_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Get an old timestamp (for testing timestamp rejection)
fn old_timestamp() -> String {
    // 10 minutes ago - beyond the 5-minute tolerance
    (chrono::Utc::now().timestamp() - 600).to_string()
}

fn compute_stripe_signature(payload: &[u8], secret: &str, timestamp: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[test]
fn test_valid_signature_accepted() {
    let client = test_stripe_client();
    let payload = b"{\"type\":\"checkout.session.completed\"}";
    let timestamp = current_timestamp();
    let signature = compute_stripe_signature(payload, TEST_WEBHOOK_SECRET, &timestamp);
    let signature_header = format!("t={},v1={}", timestamp, signature);

    let result = client
        .verify_webhook_signature(payload, &signature_header)
        .expect("Verification should not error");

    assert!(result, "Valid signature should be accepted");
}

#[test]
fn test_wrong_secret_rejected() {
    let client = test_stripe_client();
    let payload = b"{\"type\":\"checkout.session.completed\"}";
    let timestamp = current_timestamp();
    let signature = compute_stripe_signature(payload, "wrong_secret", &timestamp);
    let signature_header = format!("t={},v1={}", timestamp, signature);

    let result = client
        .verify_webhook_signature(payload, &signature_header)
        .expect("Verification should not error");

    assert!(!result, "Invalid signature should be rejected");
}

#[test]
fn test_modified_payload_rejected() {
    let client = test_stripe_client();
    let original_payload = b"{\"type\":\"checkout.session.completed\"}";
    let modified_payload = b"{\"type\":\"checkout.session.completed\",\"hacked\":true}";
    let timestamp = current_timestamp();
    let signature = compute_stripe_signature(original_payload, TEST_WEBHOOK_SECRET, &timestamp);
    let signature_header = format!("t={},v1={}", timestamp, signature);

    let result = client
        .verify_webhook_signature(modified_payload, &signature_header)
        .expect("Verification should not error");

    assert!(!result, "Modified payload should be rejected");
}

#[test]
fn test_old_timestamp_rejected() {
    let client = test_stripe_client();
    let payload = b"{\"type\":\"checkout.session.completed\"}";
    let timestamp = old_timestamp();
    let signature = compute_stripe_signature(payload, TEST_WEBHOOK_SECRET, &timestamp);
    let signature_header = format!("t={},v1={}", timestamp, signature);

    let result = client
        .verify_webhook_signature(payload, &signature_header)
        .expect("Verification should not error");

    assert!(!result, "Stale timestamp should be rejected (replay prevention)");
}

#[test]
fn test_malformed_header_errors() {
    let client = test_stripe_client();
    let payload = b"{\"type\":\"checkout.session.completed\"}";

    assert!(client.verify_webhook_signature(payload, "garbage").is_err());
    assert!(client.verify_webhook_signature(payload, "t=1234567890").is_err());
    assert!(client.verify_webhook_signature(payload, "v1=somesignature").is_err());
    assert!(client.verify_webhook_signature(payload, "").is_err());
}

// ============ Event Processing (through the router) ============

/// Sign and deliver a webhook payload to the test app.
async fn deliver_webhook(app: Router, payload: &Value) -> axum::http::StatusCode {
    let body = serde_json::to_vec(payload).unwrap();
    let timestamp = current_timestamp();
    let signature = compute_stripe_signature(&body, TEST_WEBHOOK_SECRET, &timestamp);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/stripe")
                .header("stripe-signature", format!("t={},v1={}", timestamp, signature))
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    response.status()
}

fn completion_event(request_id: &str, product_type: &str, payment_intent: &str) -> Value {
    json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_event",
                "payment_status": "paid",
                "payment_intent": payment_intent,
                "metadata": {
                    "request_id": request_id,
                    "product_type": product_type,
                }
            }
        }
    })
}

#[tokio::test]
async fn test_completion_event_marks_order_paid() {
    let state = create_test_app_state();
    let request_id = {
        let conn = state.db.get().unwrap();
        create_test_order(&conn, Tier::TextReview).request_id
    };
    let app = test_app(state.clone());

    let status = deliver_webhook(
        app,
        &completion_event(&request_id, "resume_text", "pi_hook_1"),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let conn = state.db.get().unwrap();
    let order = queries::get_order_by_request_id(&conn, &request_id)
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.fulfillment_status, FulfillmentStatus::PaidResumeText);
    assert_eq!(order.stripe_payment_intent_id.as_deref(), Some("pi_hook_1"));
}

#[tokio::test]
async fn test_completion_event_redelivery_is_idempotent() {
    let state = create_test_app_state();
    let request_id = {
        let conn = state.db.get().unwrap();
        create_test_order(&conn, Tier::TextReview).request_id
    };
    let app = test_app(state.clone());

    let event = completion_event(&request_id, "resume_text", "pi_once");
    let first = deliver_webhook(app.clone(), &event).await;
    let second = deliver_webhook(app, &event).await;

    // Both deliveries are acknowledged so the provider stops retrying
    assert_eq!(first, axum::http::StatusCode::OK);
    assert_eq!(second, axum::http::StatusCode::OK);

    let conn = state.db.get().unwrap();
    let order = queries::get_order_by_request_id(&conn, &request_id)
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.stripe_payment_intent_id.as_deref(), Some("pi_once"));
}

#[tokio::test]
async fn test_completion_event_for_coaching_sets_coaching_label() {
    let state = create_test_app_state();
    let request_id = {
        let conn = state.db.get().unwrap();
        create_test_order(&conn, Tier::Coaching).request_id
    };
    let app = test_app(state.clone());

    let status = deliver_webhook(
        app,
        &completion_event(&request_id, "premium_coaching", "pi_coach"),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let conn = state.db.get().unwrap();
    let order = queries::get_order_by_request_id(&conn, &request_id)
        .unwrap()
        .unwrap();
    assert_eq!(order.fulfillment_status, FulfillmentStatus::PaidCoaching);
}

#[tokio::test]
async fn test_completion_event_without_request_id_is_acknowledged() {
    let state = create_test_app_state();
    let app = test_app(state);

    let event = json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_no_meta",
                "payment_status": "paid",
                "payment_intent": "pi_orphan",
                "metadata": {}
            }
        }
    });

    let status = deliver_webhook(app, &event).await;
    assert_eq!(
        status,
        axum::http::StatusCode::OK,
        "Uncorrelatable events are acknowledged, not retried"
    );
}

#[tokio::test]
async fn test_failure_event_leaves_paid_order_paid() {
    let state = create_test_app_state();
    let request_id = {
        let conn = state.db.get().unwrap();
        create_paid_test_order(&conn, Tier::TextReview, "pi_done").request_id
    };
    let app = test_app(state.clone());

    let event = json!({
        "type": "payment_intent.payment_failed",
        "data": {
            "object": {
                "id": "pi_stale_attempt",
                "metadata": { "request_id": request_id }
            }
        }
    });

    let status = deliver_webhook(app, &event).await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let conn = state.db.get().unwrap();
    let order = queries::get_order_by_request_id(&conn, &request_id)
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn test_failure_event_marks_pending_order_failed() {
    let state = create_test_app_state();
    let request_id = {
        let conn = state.db.get().unwrap();
        create_test_order(&conn, Tier::TextReview).request_id
    };
    let app = test_app(state.clone());

    let event = json!({
        "type": "payment_intent.payment_failed",
        "data": {
            "object": {
                "id": "pi_declined",
                "metadata": { "request_id": request_id }
            }
        }
    });

    let status = deliver_webhook(app, &event).await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let conn = state.db.get().unwrap();
    let order = queries::get_order_by_request_id(&conn, &request_id)
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Failed);
}

#[tokio::test]
async fn test_refund_event_located_by_payment_intent() {
    let state = create_test_app_state();
    let request_id = {
        let conn = state.db.get().unwrap();
        create_paid_test_order(&conn, Tier::Coaching, "pi_refundable").request_id
    };
    let app = test_app(state.clone());

    // Refund events carry no checkout metadata - only the payment intent
    let event = json!({
        "type": "charge.refunded",
        "data": {
            "object": {
                "id": "ch_test_refund",
                "payment_intent": "pi_refundable"
            }
        }
    });

    let status = deliver_webhook(app, &event).await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let conn = state.db.get().unwrap();
    let order = queries::get_order_by_request_id(&conn, &request_id)
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn test_unknown_event_type_is_acknowledged() {
    let state = create_test_app_state();
    let app = test_app(state);

    let event = json!({
        "type": "customer.subscription.updated",
        "data": { "object": {} }
    });

    let status = deliver_webhook(app, &event).await;
    assert_eq!(status, axum::http::StatusCode::OK);
}

#[tokio::test]
async fn test_bad_signature_returns_400() {
    let state = create_test_app_state();
    let app = test_app(state);

    let body = serde_json::to_vec(&json!({
        "type": "checkout.session.completed",
        "data": { "object": {} }
    }))
    .unwrap();
    let timestamp = current_timestamp();
    let signature = compute_stripe_signature(&body, "not_the_secret", &timestamp);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/stripe")
                .header("stripe-signature", format!("t={},v1={}", timestamp, signature))
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_signature_header_returns_400() {
    let state = create_test_app_state();
    let app = test_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/stripe")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unpaid_session_completion_is_skipped() {
    let state = create_test_app_state();
    let request_id = {
        let conn = state.db.get().unwrap();
        create_test_order(&conn, Tier::TextReview).request_id
    };
    let app = test_app(state.clone());

    let event = json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_async_payment",
                "payment_status": "unpaid",
                "payment_intent": "pi_pending",
                "metadata": { "request_id": request_id, "product_type": "resume_text" }
            }
        }
    });

    let status = deliver_webhook(app, &event).await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let conn = state.db.get().unwrap();
    let order = queries::get_order_by_request_id(&conn, &request_id)
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
}
