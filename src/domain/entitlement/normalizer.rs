//! Event normalizer - maps inbound payment notifications to `PaymentEvent`.
//!
//! Three heterogeneous sources feed the reconciler: the provider's signed
//! webhook, the client's synchronous post-checkout confirmation, and the
//! renewal/cancellation notice stream (which shares the webhook channel).
//! This module reduces all of them to the internal five-event vocabulary.
//!
//! No storage access and no side effects happen here; a payload either
//! normalizes, is reported unsupported, or fails with the missing field
//! named so the boundary can return a definitive non-retryable answer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{DriverId, PassengerId, Timestamp};

use super::unlock::ChargeStatus;
use super::{NormalizeError, PaymentEvent, RenewalKind};

/// Provider webhook event envelope.
///
/// Only the fields this core consumes are captured; the rest of the
/// provider's schema is ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEvent {
    /// Unique identifier for the delivery (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object that triggered the event (polymorphic based on event type).
    pub data: ProviderEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEventData {
    pub object: Value,
}

impl ProviderEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> ProviderEventKind {
        ProviderEventKind::parse(&self.event_type)
    }
}

/// Provider event types this core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEventKind {
    /// Checkout session completed successfully.
    CheckoutSessionCompleted,
    /// Deferred payment for a checkout session failed.
    CheckoutAsyncPaymentFailed,
    /// Recurring invoice was paid.
    InvoicePaymentSucceeded,
    /// Recurring invoice payment failed.
    InvoicePaymentFailed,
    /// Subscription was deleted / ended.
    SubscriptionDeleted,
    /// Unknown or unhandled event type.
    Unknown,
}

impl ProviderEventKind {
    /// Parse event type from the provider's dotted string.
    pub fn parse(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "checkout.session.async_payment_failed" => Self::CheckoutAsyncPaymentFailed,
            "invoice.payment_succeeded" => Self::InvoicePaymentSucceeded,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            "customer.subscription.deleted" => Self::SubscriptionDeleted,
            _ => Self::Unknown,
        }
    }
}

impl RenewalKind {
    /// Resolve the provider's informal billing reason tag.
    ///
    /// This is the single place the vendor enum is interpreted; everything
    /// downstream branches on the typed discriminator.
    fn from_billing_reason(reason: &str) -> Result<Self, NormalizeError> {
        match reason {
            "subscription_cycle" => Ok(RenewalKind::CycleRenewal),
            "subscription_create" => Ok(RenewalKind::InitialPurchase),
            other => Err(NormalizeError::Unsupported(format!(
                "billing reason '{}' does not affect entitlements",
                other
            ))),
        }
    }
}

/// Synchronous post-checkout confirmation, sent by the paying client after
/// the redirect. Carries the same correlation refs as the eventual webhook
/// so the two deliveries converge on identical state.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutConfirmation {
    /// Provider checkout session reference.
    pub checkout_ref: String,

    /// Driver who paid.
    pub driver_id: DriverId,

    /// Present for membership checkouts.
    pub subscription_ref: Option<String>,

    /// Present for contact-unlock checkouts.
    pub passenger_id: Option<PassengerId>,

    /// Charge amount in the smallest currency unit (unlock checkouts).
    pub amount_cents: Option<i64>,

    /// ISO currency code (unlock checkouts).
    pub currency: Option<String>,
}

/// Normalize a verified provider webhook event.
pub fn normalize_provider_event(event: &ProviderEvent) -> Result<PaymentEvent, NormalizeError> {
    let object = &event.data.object;

    match event.parsed_type() {
        ProviderEventKind::CheckoutSessionCompleted => {
            normalize_checkout(event, object, ChargeStatus::Completed)
        }
        ProviderEventKind::CheckoutAsyncPaymentFailed => {
            normalize_checkout(event, object, ChargeStatus::Failed)
        }
        ProviderEventKind::InvoicePaymentSucceeded => {
            let subscription_ref = str_field(object, "subscription")?;
            let reason = str_field(object, "billing_reason")?;
            match RenewalKind::from_billing_reason(reason)? {
                RenewalKind::CycleRenewal => Ok(PaymentEvent::RenewalSucceeded {
                    subscription_ref: subscription_ref.to_string(),
                    period_anchor: Timestamp::from_unix_secs(
                        object
                            .get("period_start")
                            .and_then(Value::as_u64)
                            .unwrap_or(event.created.max(0) as u64),
                    ),
                }),
                // The first invoice of a subscription is covered by the
                // checkout notification; processing it here would skip the
                // activation path and under-set the expiry.
                RenewalKind::InitialPurchase => Err(NormalizeError::Unsupported(
                    "initial purchase invoices are handled by the activation path".to_string(),
                )),
            }
        }
        ProviderEventKind::InvoicePaymentFailed => Ok(PaymentEvent::RenewalFailed {
            subscription_ref: str_field(object, "subscription")?.to_string(),
        }),
        ProviderEventKind::SubscriptionDeleted => Ok(PaymentEvent::CancellationRequested {
            subscription_ref: str_field(object, "id")?.to_string(),
        }),
        ProviderEventKind::Unknown => Err(NormalizeError::Unsupported(format!(
            "no handler for event type '{}'",
            event.event_type
        ))),
    }
}

/// Normalize a synchronous checkout confirmation.
///
/// `now` becomes the activation's `valid_from`; if the webhook delivery won
/// the race its provider timestamp stands instead, and this call collapses
/// to a duplicate.
pub fn normalize_confirmation(
    confirmation: &CheckoutConfirmation,
    now: Timestamp,
) -> Result<PaymentEvent, NormalizeError> {
    if let Some(subscription_ref) = &confirmation.subscription_ref {
        return Ok(PaymentEvent::ActivationRequested {
            driver_id: confirmation.driver_id.clone(),
            subscription_ref: subscription_ref.clone(),
            valid_from: now,
        });
    }

    if let Some(passenger_id) = confirmation.passenger_id {
        return Ok(PaymentEvent::UnlockRequested {
            driver_id: confirmation.driver_id.clone(),
            passenger_id,
            amount_cents: confirmation
                .amount_cents
                .ok_or(NormalizeError::MissingField("amount_cents"))?,
            currency: confirmation
                .currency
                .clone()
                .ok_or(NormalizeError::MissingField("currency"))?,
            checkout_ref: confirmation.checkout_ref.clone(),
            charge: ChargeStatus::Completed,
        });
    }

    Err(NormalizeError::Malformed(
        "confirmation carries neither a subscription ref nor an unlock target".to_string(),
    ))
}

fn normalize_checkout(
    event: &ProviderEvent,
    object: &Value,
    charge: ChargeStatus,
) -> Result<PaymentEvent, NormalizeError> {
    match str_field(object, "mode")? {
        "subscription" => {
            if charge == ChargeStatus::Failed {
                // Membership checkouts settle synchronously; a deferred
                // failure here has no activation to undo.
                return Err(NormalizeError::Unsupported(
                    "async payment failure for a subscription checkout".to_string(),
                ));
            }
            Ok(PaymentEvent::ActivationRequested {
                driver_id: metadata_driver_id(object)?,
                subscription_ref: str_field(object, "subscription")?.to_string(),
                valid_from: Timestamp::from_unix_secs(event.created.max(0) as u64),
            })
        }
        "payment" => Ok(PaymentEvent::UnlockRequested {
            driver_id: metadata_driver_id(object)?,
            passenger_id: metadata_passenger_id(object)?,
            amount_cents: object
                .get("amount_total")
                .and_then(Value::as_i64)
                .ok_or(NormalizeError::MissingField("amount_total"))?,
            currency: str_field(object, "currency")?.to_string(),
            checkout_ref: str_field(object, "id")?.to_string(),
            charge,
        }),
        other => Err(NormalizeError::Unsupported(format!(
            "checkout mode '{}'",
            other
        ))),
    }
}

fn str_field<'a>(object: &'a Value, name: &'static str) -> Result<&'a str, NormalizeError> {
    object
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingField(name))
}

fn metadata_driver_id(object: &Value) -> Result<DriverId, NormalizeError> {
    let raw = object
        .get("metadata")
        .and_then(|m| m.get("driver_id"))
        .and_then(Value::as_str)
        .ok_or(NormalizeError::MissingField("metadata.driver_id"))?;
    DriverId::new(raw).map_err(|e| NormalizeError::Malformed(e.to_string()))
}

fn metadata_passenger_id(object: &Value) -> Result<PassengerId, NormalizeError> {
    let raw = object
        .get("metadata")
        .and_then(|m| m.get("passenger_id"))
        .and_then(Value::as_str)
        .ok_or(NormalizeError::MissingField("metadata.passenger_id"))?;
    raw.parse()
        .map_err(|_| NormalizeError::Malformed(format!("passenger_id '{}' is not a UUID", raw)))
}

/// Builder for creating test ProviderEvent instances.
#[cfg(test)]
pub struct ProviderEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for ProviderEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: 1_700_000_000,
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl ProviderEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn created(mut self, created: i64) -> Self {
        self.created = created;
        self
    }

    pub fn object(mut self, object: Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> ProviderEvent {
        ProviderEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: ProviderEventData {
                object: self.object,
            },
            livemode: self.livemode,
        }
    }
}
