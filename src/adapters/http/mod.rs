//! HTTP adapters - REST API implementations.
//!
//! The boundary layer: signature verification, driver identification,
//! status-code mapping. Session authentication proper is an external
//! collaborator; driver identity arrives via the `X-Driver-Id` header the
//! gateway injects.

pub mod entitlement;
mod error;
pub mod quota;

pub use error::{ApiError, ErrorResponse};

use std::sync::Arc;

use axum::extract::State;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::application::handlers::entitlement::{ApplyPaymentEventHandler, GetEntitlementHandler};
use crate::application::handlers::quota::{CheckAndReserveQuotaHandler, QuotaStatusHandler};
use crate::domain::entitlement::PaymentWebhookVerifier;
use crate::domain::foundation::DriverId;
use crate::ports::{
    EligibilityChecker, MembershipStore, ReferralSource, UnlockLedger, UsageCounterStore,
};

/// Shared application state containing all dependencies.
///
/// Cloned per request; everything inside is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub memberships: Arc<dyn MembershipStore>,
    pub unlocks: Arc<dyn UnlockLedger>,
    pub usage: Arc<dyn UsageCounterStore>,
    pub referrals: Arc<dyn ReferralSource>,
    pub eligibility: Arc<dyn EligibilityChecker>,
    pub webhook_verifier: Arc<PaymentWebhookVerifier>,
    /// Reject test-mode provider events (production setting).
    pub require_live_events: bool,
}

impl AppState {
    /// Create handlers on demand from the shared state.
    pub fn apply_payment_event_handler(&self) -> ApplyPaymentEventHandler {
        ApplyPaymentEventHandler::new(self.memberships.clone(), self.unlocks.clone())
    }

    pub fn get_entitlement_handler(&self) -> GetEntitlementHandler {
        GetEntitlementHandler::new(self.memberships.clone())
    }

    pub fn check_and_reserve_handler(&self) -> CheckAndReserveQuotaHandler {
        CheckAndReserveQuotaHandler::new(
            self.memberships.clone(),
            self.usage.clone(),
            self.referrals.clone(),
            self.eligibility.clone(),
        )
    }

    pub fn quota_status_handler(&self) -> QuotaStatusHandler {
        QuotaStatusHandler::new(
            self.memberships.clone(),
            self.usage.clone(),
            self.referrals.clone(),
            self.eligibility.clone(),
        )
    }
}

/// Assemble the complete API router.
///
/// # Routes
///
/// - `GET  /health` - liveness probe
/// - `GET  /api/entitlement` - membership read model
/// - `POST /api/checkout/confirm` - synchronous checkout confirmation
/// - `POST /api/quota/reserve` - check-and-reserve for the fare calculator
/// - `GET  /api/quota` - quota snapshot without consuming
/// - `POST /webhooks/payments` - provider webhook (signature verified)
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/entitlement", entitlement::entitlement_routes())
        .nest("/api/checkout", entitlement::checkout_routes())
        .nest("/api/quota", quota::quota_routes())
        .nest("/webhooks", entitlement::webhook_routes())
        .with_state(state)
}

/// Liveness probe.
async fn health_check(State(_state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "ridelink-entitlements",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Driver identity extracted from the request.
///
/// The edge gateway authenticates the session and forwards the driver id
/// in the `X-Driver-Id` header; this core treats the header as trusted.
#[derive(Debug, Clone)]
pub struct AuthenticatedDriver {
    pub driver_id: DriverId,
}

/// Rejection type for AuthenticatedDriver extraction.
pub struct DriverIdRequired;

impl IntoResponse for DriverIdRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("DRIVER_ID_REQUIRED", "X-Driver-Id header is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedDriver
where
    S: Send + Sync,
{
    type Rejection = DriverIdRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let driver_id = parts
                .headers
                .get("X-Driver-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| DriverId::new(s).ok())
                .ok_or(DriverIdRequired)?;

            Ok(AuthenticatedDriver { driver_id })
        })
    }
}
