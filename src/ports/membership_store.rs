//! Membership store port.
//!
//! Defines the contract for persisting membership records under the
//! idempotency rules the reconciler relies on.
//!
//! # Design
//!
//! - **One row per driver**: unique constraint on `driver_id`
//! - **Alternate key**: renewal/cancellation notices look records up by
//!   `subscription_ref`
//! - **Optimistic concurrency**: updates carry the version the caller read;
//!   a concurrent writer surfaces as `VersionConflict`, never a lost update.
//!   The reconciler holds no in-process lock across read-compute-write.

use async_trait::async_trait;

use crate::domain::entitlement::MembershipRecord;
use crate::domain::foundation::DriverId;

use super::StoreError;

/// Result of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was created.
    Inserted,
    /// A row for this driver already exists (concurrent first activation).
    AlreadyExists,
}

/// Result of a version-checked update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The row was replaced and its version bumped.
    Updated,
    /// Another writer got there first; re-read and re-apply.
    VersionConflict,
}

/// Port for membership record persistence.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Find the record for a driver. `None` means no membership yet.
    async fn find_by_driver_id(
        &self,
        driver_id: &DriverId,
    ) -> Result<Option<MembershipRecord>, StoreError>;

    /// Find the record holding a provider subscription ref.
    async fn find_by_subscription_ref(
        &self,
        subscription_ref: &str,
    ) -> Result<Option<MembershipRecord>, StoreError>;

    /// Insert a new record. The driver-id uniqueness constraint resolves
    /// races between concurrent first activations.
    async fn insert(&self, record: &MembershipRecord) -> Result<InsertOutcome, StoreError>;

    /// Replace the record if its stored version still equals
    /// `expected_version`. The store bumps the version on success.
    async fn update(
        &self,
        record: &MembershipRecord,
        expected_version: i32,
    ) -> Result<UpdateOutcome, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn MembershipStore) {}
    }
}
