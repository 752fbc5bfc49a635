//! Internal payment event vocabulary.
//!
//! Every inbound source (provider webhook, synchronous checkout
//! confirmation, renewal notice stream) is reduced to one of these five
//! events before it reaches the reconciler. The reconciler never sees a
//! provider payload.

use crate::domain::foundation::{DriverId, PassengerId, Timestamp};
use serde::{Deserialize, Serialize};

use super::unlock::ChargeStatus;

/// Whether a paid invoice belongs to a billing cycle renewal or to the
/// initial purchase.
///
/// The provider conflates the two behind an informal reason tag; the
/// normalizer resolves the tag into this discriminator in exactly one place
/// so no downstream code string-matches vendor enums. Initial purchases are
/// handled by the activation path only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalKind {
    CycleRenewal,
    InitialPurchase,
}

/// Normalized payment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentEvent {
    /// A completed membership checkout.
    ActivationRequested {
        driver_id: DriverId,
        subscription_ref: String,
        valid_from: Timestamp,
    },

    /// A recurring-billing cycle charge succeeded.
    RenewalSucceeded {
        subscription_ref: String,
        /// Start of the invoice's billing period. Doubles as the
        /// redelivery dedup anchor for this event.
        period_anchor: Timestamp,
    },

    /// A recurring-billing cycle charge failed.
    RenewalFailed { subscription_ref: String },

    /// The driver (or the provider) ended the subscription.
    CancellationRequested { subscription_ref: String },

    /// A one-time pay-per-contact unlock charge.
    UnlockRequested {
        driver_id: DriverId,
        passenger_id: PassengerId,
        amount_cents: i64,
        currency: String,
        checkout_ref: String,
        charge: ChargeStatus,
    },
}

impl PaymentEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentEvent::ActivationRequested { .. } => "activation_requested",
            PaymentEvent::RenewalSucceeded { .. } => "renewal_succeeded",
            PaymentEvent::RenewalFailed { .. } => "renewal_failed",
            PaymentEvent::CancellationRequested { .. } => "cancellation_requested",
            PaymentEvent::UnlockRequested { .. } => "unlock_requested",
        }
    }
}
