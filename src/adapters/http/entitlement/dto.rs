//! Request/response DTOs for the entitlement endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::handlers::entitlement::EntitlementView;
use crate::domain::entitlement::ReconcileOutcome;

/// Acknowledgement body for webhook deliveries.
///
/// Duplicates and unsupported events acknowledge with their outcome so
/// redeliveries stay observable in the provider dashboard.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: String,
}

impl WebhookAck {
    pub fn from_outcome(outcome: ReconcileOutcome) -> Self {
        Self {
            received: true,
            outcome: outcome.as_str().to_string(),
        }
    }

    pub fn ignored(reason: &str) -> Self {
        Self {
            received: true,
            outcome: reason.to_string(),
        }
    }
}

/// Body of the synchronous post-checkout confirmation.
///
/// The driver id comes from the authenticated request, never the body, so
/// a client can only confirm its own purchases.
#[derive(Debug, Deserialize)]
pub struct ConfirmCheckoutRequest {
    /// Provider checkout session reference.
    pub checkout_ref: String,

    /// Present for membership checkouts.
    pub subscription_ref: Option<String>,

    /// Present for contact-unlock checkouts.
    pub passenger_id: Option<Uuid>,

    /// Charge amount in the smallest currency unit (unlock checkouts).
    pub amount_cents: Option<i64>,

    /// ISO currency code (unlock checkouts).
    pub currency: Option<String>,
}

/// Response to a confirmation call.
#[derive(Debug, Serialize)]
pub struct ConfirmCheckoutResponse {
    pub outcome: String,
    /// Fresh entitlement state after a membership confirmation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entitlement: Option<EntitlementView>,
}
