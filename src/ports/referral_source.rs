//! Referral source port.
//!
//! Referral tracking lives in the marketplace directory; this core only
//! reads the monotonically non-decreasing total when computing a tier.

use async_trait::async_trait;

use crate::domain::foundation::DriverId;

use super::CollaboratorError;

/// Port for reading a driver's referral total.
#[async_trait]
pub trait ReferralSource: Send + Sync {
    /// Current referral total for the driver.
    async fn referral_total(&self, driver_id: &DriverId) -> Result<u32, CollaboratorError>;
}
