//! PostgreSQL implementation of UsageCounterStore.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::DriverId;
use crate::domain::quota::PeriodKey;
use crate::ports::{ReserveOutcome, StoreError, UsageCounterStore};

/// PostgreSQL implementation of the UsageCounterStore port.
pub struct PostgresUsageCounterStore {
    pool: PgPool,
}

impl PostgresUsageCounterStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageCounterStore for PostgresUsageCounterStore {
    async fn try_reserve(
        &self,
        driver_id: &DriverId,
        period: PeriodKey,
        limit: u32,
    ) -> Result<ReserveOutcome, StoreError> {
        // One statement creates the row lazily and increments it only while
        // under the limit. Splitting this into read-then-write would let
        // concurrent callers in the same period slip past the cap.
        let used: Option<i32> = sqlx::query_scalar(
            r#"
            INSERT INTO usage_counters (driver_id, period_key, used)
            VALUES ($1, $2, 1)
            ON CONFLICT (driver_id, period_key)
            DO UPDATE SET used = usage_counters.used + 1, updated_at = now()
            WHERE usage_counters.used < $3
            RETURNING used
            "#,
        )
        .bind(driver_id.as_str())
        .bind(period.to_string())
        .bind(limit as i32)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("failed to reserve usage: {}", e)))?;

        match used {
            Some(used) => Ok(ReserveOutcome::Reserved { used: used as u32 }),
            None => {
                let used = self.used(driver_id, period).await?;
                Ok(ReserveOutcome::Exhausted { used })
            }
        }
    }

    async fn used(&self, driver_id: &DriverId, period: PeriodKey) -> Result<u32, StoreError> {
        let used: Option<i32> = sqlx::query_scalar(
            "SELECT used FROM usage_counters WHERE driver_id = $1 AND period_key = $2",
        )
        .bind(driver_id.as_str())
        .bind(period.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("failed to read usage: {}", e)))?;

        Ok(used.unwrap_or(0) as u32)
    }
}
