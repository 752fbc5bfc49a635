//! In-memory MembershipStore.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entitlement::MembershipRecord;
use crate::domain::foundation::DriverId;
use crate::ports::{InsertOutcome, MembershipStore, StoreError, UpdateOutcome};

/// Mutex-guarded map keyed by driver id.
///
/// The whole insert/update runs under one lock acquisition, mirroring the
/// row-level atomicity the PostgreSQL adapter gets from its constraints.
#[derive(Default)]
pub struct InMemoryMembershipStore {
    records: Mutex<HashMap<DriverId, MembershipRecord>>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn find_by_driver_id(
        &self,
        driver_id: &DriverId,
    ) -> Result<Option<MembershipRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.get(driver_id).cloned())
    }

    async fn find_by_subscription_ref(
        &self,
        subscription_ref: &str,
    ) -> Result<Option<MembershipRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .find(|record| record.has_subscription_ref(subscription_ref))
            .cloned())
    }

    async fn insert(&self, record: &MembershipRecord) -> Result<InsertOutcome, StoreError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.driver_id) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        records.insert(record.driver_id.clone(), record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn update(
        &self,
        record: &MembershipRecord,
        expected_version: i32,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(&record.driver_id) {
            Some(stored) if stored.version == expected_version => {
                *stored = MembershipRecord {
                    version: expected_version + 1,
                    ..record.clone()
                };
                Ok(UpdateOutcome::Updated)
            }
            // Row gone or moved on; the caller re-reads and re-applies.
            _ => Ok(UpdateOutcome::VersionConflict),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::{MembershipOrigin, MembershipStatus};
    use crate::domain::foundation::Timestamp;

    fn record(driver: &str, version: i32) -> MembershipRecord {
        MembershipRecord {
            driver_id: DriverId::new(driver).unwrap(),
            status: MembershipStatus::Active,
            origin: MembershipOrigin::Paid,
            subscription_ref: Some(format!("sub_{}", driver)),
            expires_at: Timestamp::from_unix_secs(10_000),
            updated_at: Timestamp::from_unix_secs(0),
            version,
        }
    }

    #[tokio::test]
    async fn insert_then_find_roundtrips() {
        let store = InMemoryMembershipStore::new();
        let rec = record("drv_1", 1);

        assert_eq!(store.insert(&rec).await.unwrap(), InsertOutcome::Inserted);
        let found = store
            .find_by_driver_id(&rec.driver_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, rec);
    }

    #[tokio::test]
    async fn second_insert_reports_already_exists() {
        let store = InMemoryMembershipStore::new();
        let rec = record("drv_1", 1);

        store.insert(&rec).await.unwrap();
        assert_eq!(
            store.insert(&rec).await.unwrap(),
            InsertOutcome::AlreadyExists
        );
    }

    #[tokio::test]
    async fn find_by_subscription_ref_matches_stored_ref() {
        let store = InMemoryMembershipStore::new();
        store.insert(&record("drv_1", 1)).await.unwrap();

        let found = store.find_by_subscription_ref("sub_drv_1").await.unwrap();
        assert!(found.is_some());
        assert!(store
            .find_by_subscription_ref("sub_other")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_with_current_version_bumps_it() {
        let store = InMemoryMembershipStore::new();
        let rec = record("drv_1", 1);
        store.insert(&rec).await.unwrap();

        let outcome = store.update(&rec, 1).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated);

        let stored = store
            .find_by_driver_id(&rec.driver_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn update_with_stale_version_conflicts() {
        let store = InMemoryMembershipStore::new();
        let rec = record("drv_1", 1);
        store.insert(&rec).await.unwrap();
        store.update(&rec, 1).await.unwrap();

        let outcome = store.update(&rec, 1).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::VersionConflict);
    }

    #[tokio::test]
    async fn update_of_missing_row_conflicts() {
        let store = InMemoryMembershipStore::new();
        let outcome = store.update(&record("drv_1", 1), 1).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::VersionConflict);
    }
}
