//! Entitlement handlers.

mod apply_payment_event;
mod get_entitlement;

pub use apply_payment_event::ApplyPaymentEventHandler;
pub use get_entitlement::{EntitlementStatus, EntitlementView, GetEntitlementHandler};
