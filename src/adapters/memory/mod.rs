//! In-memory store implementations.
//!
//! Back the integration tests and local development runs. Each store
//! implements the same contention semantics as the PostgreSQL adapters
//! (uniqueness conflicts, version checks, conditional increments) so the
//! concurrency properties can be exercised without a database.

mod membership_store;
mod unlock_ledger;
mod usage_counter_store;

pub use membership_store::InMemoryMembershipStore;
pub use unlock_ledger::InMemoryUnlockLedger;
pub use usage_counter_store::InMemoryUsageCounterStore;
