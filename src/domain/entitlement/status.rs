//! Membership status state machine.
//!
//! Defines the stored membership states and the transitions the reconciler
//! may produce. The "no membership" state is the absence of a record, not a
//! stored status.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Stored membership status.
///
/// A record only exists after a first successful activation, so `Active` is
/// the entry state for every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Paid term in force, renewals expected.
    Active,

    /// A renewal charge failed. Access continues until `expires_at`.
    PastDue,

    /// Cancellation requested. Access continues until `expires_at`;
    /// no further renewals are expected.
    Canceled,
}

impl MembershipStatus {
    /// Returns true if this status grants access to paid features.
    ///
    /// All three stored states grant access: the driver prepaid the current
    /// term, so a failed or cancelled renewal never revokes time already
    /// paid for. Callers must additionally check `expires_at` against the
    /// current time; status alone is never sufficient.
    pub fn grants_access(&self) -> bool {
        matches!(
            self,
            MembershipStatus::Active | MembershipStatus::PastDue | MembershipStatus::Canceled
        )
    }
}

impl StateMachine for MembershipStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use MembershipStatus::*;
        matches!(
            (self, target),
            // From ACTIVE
            (Active, Active) // renewal / superseding purchase
                | (Active, PastDue)
                | (Active, Canceled)
            // From PAST_DUE
                | (PastDue, Active) // recovery
                | (PastDue, Canceled)
            // From CANCELED
                | (Canceled, Active) // re-purchase or late renewal
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MembershipStatus::*;
        match self {
            Active => vec![Active, PastDue, Canceled],
            PastDue => vec![Active, Canceled],
            Canceled => vec![Active],
        }
    }
}
