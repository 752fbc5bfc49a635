//! Allowance tier computation.
//!
//! The monthly fare-calculator allowance is a pure function of two inputs:
//! whether the driver's membership currently grants access, and the
//! referral total maintained by the directory collaborator.

use serde::{Deserialize, Serialize};

/// A quota limit bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaTier {
    /// Monthly calculator limit. `None` = unlimited.
    pub monthly_limit: Option<u32>,
}

impl QuotaTier {
    /// Compute the tier for a driver.
    ///
    /// # Tier Configuration
    ///
    /// | Membership | Referrals | Limit |
    /// |------------|-----------|-------|
    /// | none       | any       | 4     |
    /// | active     | 0         | 30    |
    /// | active     | 1-10      | 50    |
    /// | active     | 11-50     | 100   |
    /// | active     | 51+       | Unlimited |
    pub fn for_driver(membership_valid: bool, referral_total: u32) -> Self {
        if !membership_valid {
            return Self {
                monthly_limit: Some(4),
            };
        }

        let monthly_limit = match referral_total {
            0 => Some(30),
            1..=10 => Some(50),
            11..=50 => Some(100),
            _ => None,
        };

        Self { monthly_limit }
    }

    /// Returns true if this tier has no counter to enforce.
    pub fn is_unlimited(&self) -> bool {
        self.monthly_limit.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_membership_gets_base_limit() {
        let tier = QuotaTier::for_driver(false, 0);
        assert_eq!(tier.monthly_limit, Some(4));
    }

    #[test]
    fn no_membership_ignores_referrals() {
        let tier = QuotaTier::for_driver(false, 75);
        assert_eq!(tier.monthly_limit, Some(4));
    }

    #[test]
    fn member_with_no_referrals_gets_30() {
        let tier = QuotaTier::for_driver(true, 0);
        assert_eq!(tier.monthly_limit, Some(30));
    }

    #[test]
    fn member_with_5_referrals_gets_50() {
        let tier = QuotaTier::for_driver(true, 5);
        assert_eq!(tier.monthly_limit, Some(50));
    }

    #[test]
    fn member_with_25_referrals_gets_100() {
        let tier = QuotaTier::for_driver(true, 25);
        assert_eq!(tier.monthly_limit, Some(100));
    }

    #[test]
    fn member_with_75_referrals_is_unlimited() {
        let tier = QuotaTier::for_driver(true, 75);
        assert!(tier.is_unlimited());
    }

    #[test]
    fn bucket_boundaries_are_inclusive() {
        assert_eq!(QuotaTier::for_driver(true, 1).monthly_limit, Some(50));
        assert_eq!(QuotaTier::for_driver(true, 10).monthly_limit, Some(50));
        assert_eq!(QuotaTier::for_driver(true, 11).monthly_limit, Some(100));
        assert_eq!(QuotaTier::for_driver(true, 50).monthly_limit, Some(100));
        assert_eq!(QuotaTier::for_driver(true, 51).monthly_limit, None);
    }

    proptest! {
        /// More referrals never shrink the allowance.
        #[test]
        fn tier_is_monotone_in_referrals(referrals in 0u32..200) {
            let lower = QuotaTier::for_driver(true, referrals);
            let higher = QuotaTier::for_driver(true, referrals + 1);

            match (lower.monthly_limit, higher.monthly_limit) {
                (Some(a), Some(b)) => prop_assert!(b >= a),
                (Some(_), None) => {} // climbed into unlimited
                (None, None) => {}
                (None, Some(_)) => prop_assert!(false, "allowance shrank"),
            }
        }

        /// A valid membership never yields a smaller limit than none.
        #[test]
        fn membership_never_hurts(referrals in 0u32..200) {
            let without = QuotaTier::for_driver(false, referrals);
            let with = QuotaTier::for_driver(true, referrals);

            match (without.monthly_limit, with.monthly_limit) {
                (Some(a), Some(b)) => prop_assert!(b >= a),
                (Some(_), None) => {}
                _ => prop_assert!(false, "base tier should always be bounded"),
            }
        }
    }
}
