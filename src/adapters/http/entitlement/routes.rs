//! Axum router configuration for entitlement endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::AppState;

use super::handlers::{confirm_checkout, get_entitlement, handle_payment_webhook};

/// Driver-facing entitlement routes.
///
/// # Routes
/// - `GET /` - membership read model for the authenticated driver
pub fn entitlement_routes() -> Router<AppState> {
    Router::new().route("/", get(get_entitlement))
}

/// Checkout confirmation routes.
///
/// # Routes
/// - `POST /confirm` - synchronous post-redirect confirmation
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/confirm", post(confirm_checkout))
}

/// Provider webhook routes.
///
/// Separate from the driver-facing routes: webhooks carry no session
/// identity and are authenticated by signature instead.
///
/// # Routes
/// - `POST /payments` - payment provider notifications
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payments", post(handle_payment_webhook))
}
