//! HTTP handlers for the entitlement endpoints.

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::http::{ApiError, AppState, AuthenticatedDriver};
use crate::domain::entitlement::{
    normalize_confirmation, normalize_provider_event, CheckoutConfirmation, NormalizeError,
    ReconcileError,
};
use crate::domain::foundation::{PassengerId, Timestamp};

use super::dto::{ConfirmCheckoutRequest, ConfirmCheckoutResponse, WebhookAck};

/// Header carrying the provider's webhook signature.
const SIGNATURE_HEADER: &str = "X-Payment-Signature";

/// POST /webhooks/payments - provider webhook entry point.
///
/// Signature verification happens before anything else touches the
/// payload. The response status is the provider's retry signal: 2xx
/// acknowledges (including duplicates and unsupported events), 4xx is
/// definitive, 5xx requests redelivery.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingSignature)?;

    let now = Timestamp::now();
    let provider_event = state
        .webhook_verifier
        .verify_and_parse(&body, signature, now)?;

    tracing::debug!(
        event_id = %provider_event.id,
        event_type = %provider_event.event_type,
        livemode = provider_event.livemode,
        "verified provider webhook"
    );

    if state.require_live_events && !provider_event.livemode {
        tracing::info!(event_id = %provider_event.id, "ignoring test-mode event");
        return Ok((StatusCode::OK, Json(WebhookAck::ignored("test_mode_ignored"))));
    }

    let event = match normalize_provider_event(&provider_event) {
        Ok(event) => event,
        Err(NormalizeError::Unsupported(reason)) => {
            tracing::info!(
                event_id = %provider_event.id,
                event_type = %provider_event.event_type,
                reason = %reason,
                "acknowledging unsupported event"
            );
            return Ok((StatusCode::OK, Json(WebhookAck::ignored("unsupported"))));
        }
        Err(err) => return Err(ReconcileError::from(err).into()),
    };

    let outcome = state
        .apply_payment_event_handler()
        .handle(event, now)
        .await?;

    Ok((StatusCode::OK, Json(WebhookAck::from_outcome(outcome))))
}

/// POST /api/checkout/confirm - synchronous confirmation after redirect
/// checkout. Idempotent with the webhook delivery of the same purchase.
pub async fn confirm_checkout(
    State(state): State<AppState>,
    driver: AuthenticatedDriver,
    Json(request): Json<ConfirmCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Timestamp::now();

    let confirmation = CheckoutConfirmation {
        checkout_ref: request.checkout_ref,
        driver_id: driver.driver_id.clone(),
        subscription_ref: request.subscription_ref,
        passenger_id: request.passenger_id.map(PassengerId::from_uuid),
        amount_cents: request.amount_cents,
        currency: request.currency,
    };

    let event =
        normalize_confirmation(&confirmation, now).map_err(ReconcileError::from)?;
    let is_membership = confirmation.subscription_ref.is_some();

    let outcome = state
        .apply_payment_event_handler()
        .handle(event, now)
        .await?;

    let entitlement = if is_membership {
        Some(
            state
                .get_entitlement_handler()
                .handle(&driver.driver_id, now)
                .await?,
        )
    } else {
        None
    };

    Ok((
        StatusCode::OK,
        Json(ConfirmCheckoutResponse {
            outcome: outcome.as_str().to_string(),
            entitlement,
        }),
    ))
}

/// GET /api/entitlement - membership read model for dashboards.
pub async fn get_entitlement(
    State(state): State<AppState>,
    driver: AuthenticatedDriver,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .get_entitlement_handler()
        .handle(&driver.driver_id, Timestamp::now())
        .await?;

    Ok(Json(view))
}
