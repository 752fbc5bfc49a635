//! Stub directory collaborator for development and testing.
//!
//! Answers every lookup with fixed values. Replace with
//! `DirectoryApiClient` for production.

use async_trait::async_trait;

use crate::domain::foundation::DriverId;
use crate::ports::{CollaboratorError, EligibilityChecker, ReferralSource};

/// Stub that returns the same referral total and eligibility for everyone.
#[derive(Debug, Clone)]
pub struct StaticDirectoryStub {
    referral_total: u32,
    eligible: bool,
}

impl Default for StaticDirectoryStub {
    fn default() -> Self {
        Self::new(0, true)
    }
}

impl StaticDirectoryStub {
    /// Create a stub with the given referral total and eligibility.
    pub fn new(referral_total: u32, eligible: bool) -> Self {
        Self {
            referral_total,
            eligible,
        }
    }

    /// Stub that denies the role check (for testing denial flows).
    pub fn ineligible() -> Self {
        Self::new(0, false)
    }
}

#[async_trait]
impl ReferralSource for StaticDirectoryStub {
    async fn referral_total(&self, _driver_id: &DriverId) -> Result<u32, CollaboratorError> {
        Ok(self.referral_total)
    }
}

#[async_trait]
impl EligibilityChecker for StaticDirectoryStub {
    async fn is_eligible(&self, _driver_id: &DriverId) -> Result<bool, CollaboratorError> {
        Ok(self.eligible)
    }
}
