//! In-memory UnlockLedger.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entitlement::ContactUnlock;
use crate::domain::foundation::{DriverId, PassengerId};
use crate::ports::{RecordOutcome, StoreError, UnlockLedger};

/// Mutex-guarded map keyed by the `(driver, passenger)` natural key.
#[derive(Default)]
pub struct InMemoryUnlockLedger {
    rows: Mutex<HashMap<(DriverId, PassengerId), ContactUnlock>>,
}

impl InMemoryUnlockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ledger rows. Test assertions only.
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// True if the ledger holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UnlockLedger for InMemoryUnlockLedger {
    async fn record(&self, unlock: &ContactUnlock) -> Result<RecordOutcome, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.entry((unlock.driver_id.clone(), unlock.passenger_id)) {
            Entry::Occupied(_) => Ok(RecordOutcome::AlreadyRecorded),
            Entry::Vacant(slot) => {
                slot.insert(unlock.clone());
                Ok(RecordOutcome::Recorded)
            }
        }
    }

    async fn find(
        &self,
        driver_id: &DriverId,
        passenger_id: &PassengerId,
    ) -> Result<Option<ContactUnlock>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&(driver_id.clone(), *passenger_id)).cloned())
    }
}
