//! Contact-unlock ledger port.
//!
//! The `(driver_id, passenger_id)` uniqueness constraint - not a lock - is
//! what resolves duplicate-delivery races: it is the cheapest correct
//! primitive for "insert at most once".

use async_trait::async_trait;

use crate::domain::entitlement::ContactUnlock;
use crate::domain::foundation::{DriverId, PassengerId};

use super::StoreError;

/// Result of recording an unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new ledger row was written.
    Recorded,
    /// The natural key already exists; the earlier row stands.
    AlreadyRecorded,
}

/// Port for the pay-per-contact unlock ledger.
#[async_trait]
pub trait UnlockLedger: Send + Sync {
    /// Record an unlock. A natural-key conflict is success, not failure:
    /// the same purchase may arrive from the webhook and from the
    /// synchronous confirmation.
    async fn record(&self, unlock: &ContactUnlock) -> Result<RecordOutcome, StoreError>;

    /// Fetch the ledger row for a pair, if any.
    async fn find(
        &self,
        driver_id: &DriverId,
        passenger_id: &PassengerId,
    ) -> Result<Option<ContactUnlock>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlock_ledger_is_object_safe() {
        fn _accepts_dyn(_ledger: &dyn UnlockLedger) {}
    }
}
