//! Membership record entity.
//!
//! One record per driver, keyed by `driver_id`. The record is created on the
//! first successful activation and only ever mutated by the reconciler;
//! cancellation is a status transition, never a deletion, so the audit
//! history survives.
//!
//! # Invariants
//!
//! - `driver_id` is unique (one membership per driver)
//! - `updated_at` is monotonically non-decreasing
//! - `status` alone never decides entitlement; `expires_at` must also be
//!   checked against an explicit `now`

use crate::domain::foundation::{DriverId, Timestamp};
use serde::{Deserialize, Serialize};

use super::MembershipStatus;

/// How the membership came to exist.
///
/// `Granted` rows are created by support staff outside this core; automated
/// reconciliation must preserve the origin when it touches such a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipOrigin {
    /// Activated through the payment provider.
    Paid,

    /// Granted manually by an administrator.
    Granted,
}

/// Membership record - one per driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    /// Driver who owns this membership.
    pub driver_id: DriverId,

    /// Current status in the subscription lifecycle.
    pub status: MembershipStatus,

    /// Provider-sourced activation vs. manual grant.
    pub origin: MembershipOrigin,

    /// Provider's recurring-billing reference. Alternate lookup key for
    /// renewal and cancellation notices, which do not carry a driver id.
    pub subscription_ref: Option<String>,

    /// End of the prepaid term.
    pub expires_at: Timestamp,

    /// When the record was last written.
    pub updated_at: Timestamp,

    /// Optimistic-concurrency counter, bumped on every update.
    pub version: i32,
}

impl MembershipRecord {
    /// Check if this membership currently grants access.
    ///
    /// True only while the status grants access AND the prepaid term has
    /// not lapsed. A record can be `active` in storage yet expired in
    /// wall-clock terms between renewal deliveries.
    pub fn grants_access(&self, now: Timestamp) -> bool {
        self.status.grants_access() && now < self.expires_at
    }

    /// True if the stored subscription ref matches the given one.
    pub fn has_subscription_ref(&self, subscription_ref: &str) -> bool {
        self.subscription_ref.as_deref() == Some(subscription_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: MembershipStatus, expires_at: Timestamp) -> MembershipRecord {
        MembershipRecord {
            driver_id: DriverId::new("drv_1").unwrap(),
            status,
            origin: MembershipOrigin::Paid,
            subscription_ref: Some("sub_123".to_string()),
            expires_at,
            updated_at: Timestamp::from_unix_secs(0),
            version: 1,
        }
    }

    #[test]
    fn active_and_unexpired_grants_access() {
        let now = Timestamp::from_unix_secs(1_000);
        let rec = record(MembershipStatus::Active, now.add_days(30));
        assert!(rec.grants_access(now));
    }

    #[test]
    fn active_but_expired_denies_access() {
        let now = Timestamp::from_unix_secs(1_000);
        let rec = record(MembershipStatus::Active, now.add_days(-1));
        assert!(!rec.grants_access(now));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Timestamp::from_unix_secs(1_000);
        let rec = record(MembershipStatus::Active, now);
        assert!(!rec.grants_access(now));
    }

    #[test]
    fn canceled_but_unexpired_still_grants_access() {
        let now = Timestamp::from_unix_secs(1_000);
        let rec = record(MembershipStatus::Canceled, now.add_days(10));
        assert!(rec.grants_access(now));
    }

    #[test]
    fn past_due_but_unexpired_still_grants_access() {
        let now = Timestamp::from_unix_secs(1_000);
        let rec = record(MembershipStatus::PastDue, now.add_days(10));
        assert!(rec.grants_access(now));
    }

    #[test]
    fn subscription_ref_match_is_exact() {
        let rec = record(MembershipStatus::Active, Timestamp::from_unix_secs(10));
        assert!(rec.has_subscription_ref("sub_123"));
        assert!(!rec.has_subscription_ref("sub_456"));
    }
}
