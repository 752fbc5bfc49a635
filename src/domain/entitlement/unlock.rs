//! Contact unlock ledger entry.
//!
//! A one-time charge that reveals a passenger's contact details to a driver.
//! The `(driver_id, passenger_id)` pair is the natural key: the same unlock
//! may be reported by the provider webhook and by the client's synchronous
//! confirmation, and both must land on a single row.

use crate::domain::foundation::{DriverId, PassengerId, Timestamp};
use serde::{Deserialize, Serialize};

/// Outcome of the one-time charge as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Completed,
    Failed,
}

/// Ledger entry for a pay-per-contact unlock. Insert-once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUnlock {
    /// Driver who paid.
    pub driver_id: DriverId,

    /// Passenger whose contact details were unlocked.
    pub passenger_id: PassengerId,

    /// Charge amount in the smallest currency unit.
    pub amount_cents: i64,

    /// ISO currency code.
    pub currency: String,

    /// Provider checkout session reference (correlates webhook and
    /// synchronous confirmation).
    pub checkout_ref: String,

    /// Charge outcome.
    pub charge: ChargeStatus,

    /// When the unlock was recorded.
    pub recorded_at: Timestamp,
}
