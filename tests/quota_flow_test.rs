//! Integration tests for the quota endpoints.
//!
//! Exercises tier selection, the atomic monthly counter, and the denial
//! bodies over the real axum router with in-memory adapters.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::future::join_all;
use serde_json::{json, Value};
use tower::ServiceExt;

use ridelink::adapters::directory::StaticDirectoryStub;
use ridelink::adapters::http::{app_router, AppState};
use ridelink::adapters::memory::{
    InMemoryMembershipStore, InMemoryUnlockLedger, InMemoryUsageCounterStore,
};
use ridelink::domain::entitlement::{sign_test_payload, PaymentWebhookVerifier};

const WEBHOOK_SECRET: &str = "whsec_test_secret";
const DRIVER: &str = "drv_42";

// =============================================================================
// Test Infrastructure
// =============================================================================

fn test_app(referral_total: u32, eligible: bool) -> Router {
    let directory = Arc::new(StaticDirectoryStub::new(referral_total, eligible));

    let state = AppState {
        memberships: Arc::new(InMemoryMembershipStore::new()),
        unlocks: Arc::new(InMemoryUnlockLedger::new()),
        usage: Arc::new(InMemoryUsageCounterStore::new()),
        referrals: directory.clone(),
        eligibility: directory,
        webhook_verifier: Arc::new(PaymentWebhookVerifier::new(WEBHOOK_SECRET)),
        require_live_events: false,
    };

    app_router(state)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn reserve(router: &Router) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/quota/reserve")
        .header("X-Driver-Id", DRIVER)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

async fn quota_status(router: &Router) -> Value {
    let request = Request::builder()
        .method("GET")
        .uri("/api/quota")
        .header("X-Driver-Id", DRIVER)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    body
}

/// Activate a membership for DRIVER through the real webhook endpoint.
async fn activate_membership(router: &Router) {
    let payload = json!({
        "id": "evt_activation",
        "type": "checkout.session.completed",
        "created": chrono::Utc::now().timestamp(),
        "data": { "object": {
            "id": "cs_test_a1",
            "mode": "subscription",
            "subscription": "sub_100",
            "metadata": { "driver_id": DRIVER }
        }},
        "livemode": false
    })
    .to_string();

    let signature = sign_test_payload(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), &payload);
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/payments")
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("X-Payment-Signature", signature)
        .body(Body::from(payload))
        .unwrap();

    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK, "activation failed: {:?}", body);
}

// =============================================================================
// Tier selection
// =============================================================================

#[tokio::test]
async fn driver_without_membership_gets_4_per_month() {
    let router = test_app(0, true);

    for i in (0..4).rev() {
        let (status, body) = reserve(&router).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "allowed");
        assert_eq!(body["remaining"], i);
    }

    let (status, body) = reserve(&router).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision"], "denied");
    assert_eq!(body["reason"], "quota_exceeded");
    assert_eq!(body["limit"], 4);
    assert!(body["resets_at"].is_string());
}

#[tokio::test]
async fn member_without_referrals_gets_30() {
    let router = test_app(0, true);
    activate_membership(&router).await;

    let (_, body) = reserve(&router).await;
    assert_eq!(body["decision"], "allowed");
    assert_eq!(body["tier"]["monthly_limit"], 30);
    assert_eq!(body["remaining"], 29);
}

#[tokio::test]
async fn member_with_5_referrals_gets_50() {
    let router = test_app(5, true);
    activate_membership(&router).await;

    let (_, body) = reserve(&router).await;
    assert_eq!(body["tier"]["monthly_limit"], 50);
}

#[tokio::test]
async fn member_with_25_referrals_gets_100() {
    let router = test_app(25, true);
    activate_membership(&router).await;

    let (_, body) = reserve(&router).await;
    assert_eq!(body["tier"]["monthly_limit"], 100);
}

#[tokio::test]
async fn member_with_75_referrals_is_unlimited() {
    let router = test_app(75, true);
    activate_membership(&router).await;

    let (_, body) = reserve(&router).await;
    assert_eq!(body["decision"], "allowed");
    assert!(body["remaining"].is_null());

    // No counter writes occur for the unlimited tier.
    let status = quota_status(&router).await;
    assert_eq!(status["used"], 0);
}

#[tokio::test]
async fn referrals_without_membership_stay_on_base_limit() {
    let router = test_app(75, true);

    let (_, body) = reserve(&router).await;
    assert_eq!(body["tier"]["monthly_limit"], 4);
}

// =============================================================================
// Denials
// =============================================================================

#[tokio::test]
async fn non_driver_is_hard_denied() {
    let router = test_app(0, false);

    let (status, body) = reserve(&router).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision"], "denied");
    assert_eq!(body["reason"], "not_eligible");

    let status = quota_status(&router).await;
    assert_eq!(status["used"], 0);
}

#[tokio::test]
async fn exhausted_quota_denies_every_subsequent_call() {
    let router = test_app(0, true);

    for _ in 0..4 {
        reserve(&router).await;
    }

    for _ in 0..3 {
        let (_, body) = reserve(&router).await;
        assert_eq!(body["decision"], "denied");
        assert_eq!(body["reason"], "quota_exceeded");
    }

    // The counter never passes the limit.
    let status = quota_status(&router).await;
    assert_eq!(status["used"], 4);
}

#[tokio::test]
async fn concurrent_reservations_never_grant_extra_quota() {
    let router = test_app(0, true);

    let tasks: Vec<_> = (0..20).map(|_| reserve(&router)).collect();
    let results = join_all(tasks).await;

    let allowed = results
        .iter()
        .filter(|(_, body)| body["decision"] == "allowed")
        .count();
    assert_eq!(allowed, 4);

    let status = quota_status(&router).await;
    assert_eq!(status["used"], 4);
}

// =============================================================================
// Status endpoint
// =============================================================================

#[tokio::test]
async fn status_reports_without_consuming() {
    let router = test_app(0, true);

    reserve(&router).await;

    let first = quota_status(&router).await;
    assert_eq!(first["used"], 1);
    assert_eq!(first["remaining"], 3);
    assert!(first["eligible"].as_bool().unwrap());
    assert!(first["resets_at"].is_string());

    let second = quota_status(&router).await;
    assert_eq!(second["used"], 1);
}

#[tokio::test]
async fn quota_endpoints_require_driver_header() {
    let router = test_app(0, true);

    let request = Request::builder()
        .method("POST")
        .uri("/api/quota/reserve")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
