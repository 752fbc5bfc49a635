//! QuotaStatusHandler - read-only quota snapshot.
//!
//! Lets dashboards show "17 of 50 left, resets Feb 1" without consuming a
//! unit. Shares the tier computation with the reservation path.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DriverId, Timestamp};
use crate::domain::quota::{PeriodKey, QuotaTier};
use crate::ports::{EligibilityChecker, MembershipStore, ReferralSource, UsageCounterStore};

use super::QuotaError;

/// Snapshot of a driver's quota for the current period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaStatusView {
    pub eligible: bool,
    pub tier: QuotaTier,
    pub used: u32,
    /// Units left in the period. `None` = unlimited.
    pub remaining: Option<u32>,
    pub period: PeriodKey,
    pub resets_at: Timestamp,
}

/// Handler for the quota status read model.
pub struct QuotaStatusHandler {
    memberships: Arc<dyn MembershipStore>,
    usage: Arc<dyn UsageCounterStore>,
    referrals: Arc<dyn ReferralSource>,
    eligibility: Arc<dyn EligibilityChecker>,
}

impl QuotaStatusHandler {
    pub fn new(
        memberships: Arc<dyn MembershipStore>,
        usage: Arc<dyn UsageCounterStore>,
        referrals: Arc<dyn ReferralSource>,
        eligibility: Arc<dyn EligibilityChecker>,
    ) -> Self {
        Self {
            memberships,
            usage,
            referrals,
            eligibility,
        }
    }

    pub async fn handle(
        &self,
        driver_id: &DriverId,
        now: Timestamp,
    ) -> Result<QuotaStatusView, QuotaError> {
        let period = PeriodKey::containing(now);
        let eligible = self.eligibility.is_eligible(driver_id).await?;

        let membership_valid = self
            .memberships
            .find_by_driver_id(driver_id)
            .await?
            .map(|record| record.grants_access(now))
            .unwrap_or(false);

        let referral_total = self.referrals.referral_total(driver_id).await?;
        let tier = QuotaTier::for_driver(membership_valid, referral_total);
        let used = self.usage.used(driver_id, period).await?;

        Ok(QuotaStatusView {
            eligible,
            tier,
            used,
            remaining: tier.monthly_limit.map(|limit| limit.saturating_sub(used)),
            period,
            resets_at: period.resets_at(),
        })
    }
}
