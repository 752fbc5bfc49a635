//! GetEntitlementHandler - read model for membership state.
//!
//! Used by dashboards and the directory UI to render a driver's paid
//! status. The absence of a record surfaces as an explicit `none` status
//! rather than a missing-resource error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::entitlement::{MembershipOrigin, MembershipStatus};
use crate::domain::foundation::{DriverId, Timestamp};
use crate::ports::{MembershipStore, StoreError};

/// Entitlement status as seen by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementStatus {
    /// No membership record exists.
    None,
    Active,
    PastDue,
    Canceled,
}

impl From<MembershipStatus> for EntitlementStatus {
    fn from(status: MembershipStatus) -> Self {
        match status {
            MembershipStatus::Active => EntitlementStatus::Active,
            MembershipStatus::PastDue => EntitlementStatus::PastDue,
            MembershipStatus::Canceled => EntitlementStatus::Canceled,
        }
    }
}

/// Read model for a driver's entitlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementView {
    pub status: EntitlementStatus,
    pub origin: Option<MembershipOrigin>,
    pub expires_at: Option<Timestamp>,
    /// The derived access decision: status grants access AND the term has
    /// not lapsed at the supplied instant.
    pub entitled: bool,
}

/// Handler for the entitlement read model.
pub struct GetEntitlementHandler {
    memberships: Arc<dyn MembershipStore>,
}

impl GetEntitlementHandler {
    pub fn new(memberships: Arc<dyn MembershipStore>) -> Self {
        Self { memberships }
    }

    pub async fn handle(
        &self,
        driver_id: &DriverId,
        now: Timestamp,
    ) -> Result<EntitlementView, StoreError> {
        let record = self.memberships.find_by_driver_id(driver_id).await?;

        Ok(match record {
            None => EntitlementView {
                status: EntitlementStatus::None,
                origin: None,
                expires_at: None,
                entitled: false,
            },
            Some(record) => EntitlementView {
                status: record.status.into(),
                origin: Some(record.origin),
                expires_at: Some(record.expires_at),
                entitled: record.grants_access(now),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMembershipStore;
    use crate::domain::entitlement::MembershipRecord;
    use crate::ports::InsertOutcome;

    async fn store_with(record: MembershipRecord) -> Arc<InMemoryMembershipStore> {
        let store = Arc::new(InMemoryMembershipStore::new());
        assert_eq!(
            store.insert(&record).await.unwrap(),
            InsertOutcome::Inserted
        );
        store
    }

    fn record(status: MembershipStatus, expires_at: Timestamp) -> MembershipRecord {
        MembershipRecord {
            driver_id: DriverId::new("drv_1").unwrap(),
            status,
            origin: MembershipOrigin::Paid,
            subscription_ref: Some("sub_1".to_string()),
            expires_at,
            updated_at: Timestamp::from_unix_secs(0),
            version: 1,
        }
    }

    #[tokio::test]
    async fn missing_record_reads_as_none() {
        let handler = GetEntitlementHandler::new(Arc::new(InMemoryMembershipStore::new()));

        let view = handler
            .handle(
                &DriverId::new("drv_1").unwrap(),
                Timestamp::from_unix_secs(0),
            )
            .await
            .unwrap();

        assert_eq!(view.status, EntitlementStatus::None);
        assert!(!view.entitled);
        assert!(view.expires_at.is_none());
    }

    #[tokio::test]
    async fn active_unexpired_record_is_entitled() {
        let now = Timestamp::from_unix_secs(1_000);
        let store = store_with(record(MembershipStatus::Active, now.add_days(30))).await;
        let handler = GetEntitlementHandler::new(store);

        let view = handler
            .handle(&DriverId::new("drv_1").unwrap(), now)
            .await
            .unwrap();

        assert_eq!(view.status, EntitlementStatus::Active);
        assert!(view.entitled);
    }

    #[tokio::test]
    async fn active_but_expired_record_is_not_entitled() {
        let now = Timestamp::from_unix_secs(1_000);
        let store = store_with(record(MembershipStatus::Active, now.add_days(-1))).await;
        let handler = GetEntitlementHandler::new(store);

        let view = handler
            .handle(&DriverId::new("drv_1").unwrap(), now)
            .await
            .unwrap();

        assert_eq!(view.status, EntitlementStatus::Active);
        assert!(!view.entitled);
    }

    #[tokio::test]
    async fn canceled_but_unexpired_record_stays_entitled() {
        let now = Timestamp::from_unix_secs(1_000);
        let store = store_with(record(MembershipStatus::Canceled, now.add_days(10))).await;
        let handler = GetEntitlementHandler::new(store);

        let view = handler
            .handle(&DriverId::new("drv_1").unwrap(), now)
            .await
            .unwrap();

        assert_eq!(view.status, EntitlementStatus::Canceled);
        assert!(view.entitled);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&EntitlementStatus::PastDue).unwrap(),
            "\"past_due\""
        );
        assert_eq!(
            serde_json::to_string(&EntitlementStatus::None).unwrap(),
            "\"none\""
        );
    }
}
