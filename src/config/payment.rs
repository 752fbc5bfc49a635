//! Payment provider configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment provider configuration.
///
/// The core only consumes signed notifications; checkout/session creation
/// lives with the marketplace app, so no API key is needed here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Webhook signing secret from the provider dashboard
    pub webhook_secret: String,

    /// Reject test-mode events (enable in production)
    #[serde(default)]
    pub require_live_events: bool,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }
        // Verify secret prefix for safety
        if !self.webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidWebhookSecret);
        }
        Ok(())
    }
}
