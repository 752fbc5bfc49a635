//! Quota decision types.
//!
//! A denial is an answer, not an error: the caller relays it to the driver
//! (with the reset date for exhausted quotas) while transport-level failures
//! travel separately.

use crate::domain::foundation::Timestamp;

use super::QuotaTier;

/// Why a metered action was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The subject has no qualifying role (e.g. is not a driver).
    /// Hard denial; no counter is touched.
    NotEligible,

    /// The monthly allowance is used up. Soft denial; the counter stays at
    /// the limit and resets at the calendar-month boundary.
    QuotaExceeded { limit: u32, resets_at: Timestamp },
}

/// Outcome of a reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// The action may proceed; one unit was reserved (unless unlimited).
    Allowed {
        tier: QuotaTier,
        /// Units left after this reservation. `None` = unlimited.
        remaining: Option<u32>,
    },

    /// The action must not proceed.
    Denied { reason: DenialReason },
}

impl QuotaDecision {
    /// Returns true if the action may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allowed { .. })
    }
}
