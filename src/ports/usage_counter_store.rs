//! Usage counter store port.
//!
//! The reservation must be a single atomic conditional increment at the
//! storage layer. A read-count-then-write-count+1 sequence silently grants
//! extra quota under concurrent requests in the same period; implementations
//! must not decompose the operation.

use async_trait::async_trait;

use crate::domain::foundation::DriverId;
use crate::domain::quota::PeriodKey;

use super::StoreError;

/// Result of a reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// One unit was reserved; `used` is the count after the increment.
    Reserved { used: u32 },
    /// The counter already reached the limit; nothing was written.
    Exhausted { used: u32 },
}

/// Port for monthly usage counters.
#[async_trait]
pub trait UsageCounterStore: Send + Sync {
    /// Atomically reserve one unit for `(driver_id, period)` while the
    /// counter is below `limit`. Creates the row lazily on first use.
    async fn try_reserve(
        &self,
        driver_id: &DriverId,
        period: PeriodKey,
        limit: u32,
    ) -> Result<ReserveOutcome, StoreError>;

    /// Units consumed so far in the period (0 if the row does not exist).
    async fn used(&self, driver_id: &DriverId, period: PeriodKey) -> Result<u32, StoreError>;
}
