//! PostgreSQL adapters.
//!
//! One file per port. Concurrency control lives in the database itself:
//! uniqueness constraints absorb duplicate inserts, a version column guards
//! read-compute-write cycles, and the usage counter increments inside a
//! single conditional statement.

mod membership_store;
mod unlock_ledger;
mod usage_counter_store;

pub use membership_store::PostgresMembershipStore;
pub use unlock_ledger::PostgresUnlockLedger;
pub use usage_counter_store::PostgresUsageCounterStore;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::ports::StoreError;

/// Build a connection pool from configuration.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await
        .map_err(|e| StoreError::Unavailable(format!("failed to connect: {}", e)))
}
