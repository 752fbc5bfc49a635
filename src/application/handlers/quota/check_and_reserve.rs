//! CheckAndReserveQuotaHandler - gate and meter the fare calculator.
//!
//! Answers "may this driver run the calculator right now, and if so record
//! the consumption" in one call. The reservation itself is a single atomic
//! conditional increment at the storage layer; this handler never reads a
//! count and writes it back.

use std::sync::Arc;

use crate::domain::foundation::{DriverId, Timestamp};
use crate::domain::quota::{DenialReason, PeriodKey, QuotaDecision, QuotaTier};
use crate::ports::{
    EligibilityChecker, MembershipStore, ReferralSource, ReserveOutcome, UsageCounterStore,
};

use super::QuotaError;

/// Handler for metered-action reservations.
pub struct CheckAndReserveQuotaHandler {
    memberships: Arc<dyn MembershipStore>,
    usage: Arc<dyn UsageCounterStore>,
    referrals: Arc<dyn ReferralSource>,
    eligibility: Arc<dyn EligibilityChecker>,
}

impl CheckAndReserveQuotaHandler {
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

    #[tracing::instrument(skip(self), fields(driver_id = %driver_id))]
    pub async fn handle(
        &self,
        driver_id: &DriverId,
        now: Timestamp,
    ) -> Result<QuotaDecision, QuotaError> {
        // Hard gate first: ineligible subjects never touch a counter.
        if !self.eligibility.is_eligible(driver_id).await? {
            tracing::info!("metered action denied: not eligible");
            return Ok(QuotaDecision::Denied {
                reason: DenialReason::NotEligible,
            });
        }

        let membership_valid = self
            .memberships
            .find_by_driver_id(driver_id)
            .await?
            .map(|record| record.grants_access(now))
            .unwrap_or(false);

        let referral_total = self.referrals.referral_total(driver_id).await?;
        let tier = QuotaTier::for_driver(membership_valid, referral_total);

        let Some(limit) = tier.monthly_limit else {
            // Unlimited tier: no counter is read or written.
            return Ok(QuotaDecision::Allowed {
                tier,
                remaining: None,
            });
        };

        let period = PeriodKey::containing(now);
        match self.usage.try_reserve(driver_id, period, limit).await? {
            ReserveOutcome::Reserved { used } => Ok(QuotaDecision::Allowed {
                tier,
                remaining: Some(limit.saturating_sub(used)),
            }),
            ReserveOutcome::Exhausted { .. } => {
                tracing::info!(limit, period = %period, "metered action denied: quota exhausted");
                Ok(QuotaDecision::Denied {
                    reason: DenialReason::QuotaExceeded {
                        limit,
                        resets_at: period.resets_at(),
                    },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::directory::StaticDirectoryStub;
    use crate::adapters::memory::{InMemoryMembershipStore, InMemoryUsageCounterStore};
    use crate::domain::entitlement::{MembershipOrigin, MembershipRecord, MembershipStatus};
    use crate::ports::InsertOutcome;
    use futures::future::join_all;

    const NOW_SECS: u64 = 1_705_276_800; // 2024-01-15T00:00:00Z

    struct Fixture {
        handler: Arc<CheckAndReserveQuotaHandler>,
        memberships: Arc<InMemoryMembershipStore>,
        usage: Arc<InMemoryUsageCounterStore>,
    }

    fn fixture(referral_total: u32, eligible: bool) -> Fixture {
        let memberships = Arc::new(InMemoryMembershipStore::new());
        let usage = Arc::new(InMemoryUsageCounterStore::new());
        let directory = Arc::new(StaticDirectoryStub::new(referral_total, eligible));
        let handler = Arc::new(CheckAndReserveQuotaHandler::new(
            memberships.clone(),
            usage.clone(),
            directory.clone(),
            directory,
        ));
        Fixture {
            handler,
            memberships,
            usage,
        }
    }

    fn driver() -> DriverId {
        DriverId::new("drv_1").unwrap()
    }

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(NOW_SECS)
    }

    async fn activate_membership(memberships: &InMemoryMembershipStore) {
        let record = MembershipRecord {
            driver_id: driver(),
            status: MembershipStatus::Active,
            origin: MembershipOrigin::Paid,
            subscription_ref: Some("sub_1".to_string()),
            expires_at: now().add_days(300),
            updated_at: now(),
            version: 1,
        };
        assert_eq!(
            memberships.insert(&record).await.unwrap(),
            InsertOutcome::Inserted
        );
    }

    #[tokio::test]
    async fn ineligible_subject_is_hard_denied_without_counter_touch() {
        let f = fixture(0, false);

        let decision = f.handler.handle(&driver(), now()).await.unwrap();

        assert_eq!(
            decision,
            QuotaDecision::Denied {
                reason: DenialReason::NotEligible
            }
        );
        assert_eq!(
            f.usage
                .used(&driver(), PeriodKey::containing(now()))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn no_membership_gets_base_limit_of_4() {
        let f = fixture(0, true);

        for i in 0..4 {
            let decision = f.handler.handle(&driver(), now()).await.unwrap();
            match decision {
                QuotaDecision::Allowed { remaining, .. } => {
                    assert_eq!(remaining, Some(3 - i));
                }
                other => panic!("expected allowed, got {:?}", other),
            }
        }

        let fifth = f.handler.handle(&driver(), now()).await.unwrap();
        assert!(matches!(
            fifth,
            QuotaDecision::Denied {
                reason: DenialReason::QuotaExceeded { limit: 4, .. }
            }
        ));
    }

    #[tokio::test]
    async fn member_without_referrals_gets_30() {
        let f = fixture(0, true);
        activate_membership(&f.memberships).await;

        match f.handler.handle(&driver(), now()).await.unwrap() {
            QuotaDecision::Allowed { tier, remaining } => {
                assert_eq!(tier.monthly_limit, Some(30));
                assert_eq!(remaining, Some(29));
            }
            other => panic!("expected allowed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn member_with_75_referrals_is_unlimited_and_writes_nothing() {
        let f = fixture(75, true);
        activate_membership(&f.memberships).await;

        for _ in 0..10 {
            match f.handler.handle(&driver(), now()).await.unwrap() {
                QuotaDecision::Allowed { remaining, .. } => assert_eq!(remaining, None),
                other => panic!("expected allowed, got {:?}", other),
            }
        }

        assert_eq!(
            f.usage
                .used(&driver(), PeriodKey::containing(now()))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn expired_membership_falls_back_to_base_limit() {
        let f = fixture(5, true);
        let record = MembershipRecord {
            driver_id: driver(),
            status: MembershipStatus::Active,
            origin: MembershipOrigin::Paid,
            subscription_ref: Some("sub_1".to_string()),
            expires_at: now().add_days(-1),
            updated_at: now(),
            version: 1,
        };
        f.memberships.insert(&record).await.unwrap();

        match f.handler.handle(&driver(), now()).await.unwrap() {
            QuotaDecision::Allowed { tier, .. } => assert_eq!(tier.monthly_limit, Some(4)),
            other => panic!("expected allowed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn denial_reports_next_calendar_month_reset() {
        let f = fixture(0, true);

        for _ in 0..4 {
            f.handler.handle(&driver(), now()).await.unwrap();
        }

        match f.handler.handle(&driver(), now()).await.unwrap() {
            QuotaDecision::Denied {
                reason: DenialReason::QuotaExceeded { resets_at, .. },
            } => {
                // 2024-02-01T00:00:00Z
                assert_eq!(resets_at, Timestamp::from_unix_secs(1_706_745_600));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn new_month_starts_a_fresh_counter() {
        let f = fixture(0, true);

        for _ in 0..4 {
            f.handler.handle(&driver(), now()).await.unwrap();
        }
        assert!(!f.handler.handle(&driver(), now()).await.unwrap().is_allowed());

        // 2024-02-02T00:00:00Z
        let next_month = Timestamp::from_unix_secs(1_706_832_000);
        assert!(f
            .handler
            .handle(&driver(), next_month)
            .await
            .unwrap()
            .is_allowed());
    }

    #[tokio::test]
    async fn concurrent_reservations_never_exceed_the_limit() {
        let f = fixture(0, true);

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let handler = f.handler.clone();
                async move { handler.handle(&driver(), now()).await.unwrap() }
            })
            .collect();

        let decisions = join_all(tasks).await;
        let allowed = decisions.iter().filter(|d| d.is_allowed()).count();

        assert_eq!(allowed, 4);
        assert_eq!(
            f.usage
                .used(&driver(), PeriodKey::containing(now()))
                .await
                .unwrap(),
            4
        );
    }
}
