//! Entitlement HTTP endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{ConfirmCheckoutRequest, ConfirmCheckoutResponse, WebhookAck};
pub use handlers::{confirm_checkout, get_entitlement, handle_payment_webhook};
pub use routes::{checkout_routes, entitlement_routes, webhook_routes};
