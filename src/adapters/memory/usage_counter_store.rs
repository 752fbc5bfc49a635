//! In-memory UsageCounterStore.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::DriverId;
use crate::domain::quota::PeriodKey;
use crate::ports::{ReserveOutcome, StoreError, UsageCounterStore};

/// Mutex-guarded counters keyed by `(driver, period)`.
///
/// The check-and-increment happens inside one lock acquisition; the count
/// can never pass the limit no matter how many callers race.
#[derive(Default)]
pub struct InMemoryUsageCounterStore {
    counters: Mutex<HashMap<(DriverId, PeriodKey), u32>>,
}

impl InMemoryUsageCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageCounterStore for InMemoryUsageCounterStore {
    async fn try_reserve(
        &self,
        driver_id: &DriverId,
        period: PeriodKey,
        limit: u32,
    ) -> Result<ReserveOutcome, StoreError> {
        let mut counters = self.counters.lock().unwrap();
        let count = counters.entry((driver_id.clone(), period)).or_insert(0);

        if *count >= limit {
            return Ok(ReserveOutcome::Exhausted { used: *count });
        }

        *count += 1;
        Ok(ReserveOutcome::Reserved { used: *count })
    }

    async fn used(&self, driver_id: &DriverId, period: PeriodKey) -> Result<u32, StoreError> {
        let counters = self.counters.lock().unwrap();
        Ok(counters
            .get(&(driver_id.clone(), period))
            .copied()
            .unwrap_or(0))
    }
}
