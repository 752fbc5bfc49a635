//! Membership reconciliation state machine.
//!
//! The transition is a pure function of `(current record, event, now)`.
//! It never rejects an event because the prior state looks wrong: the new
//! state is always computed and written, so redelivery of the same event
//! converges instead of erroring. Duplicates collapse to an explicit no-op
//! so that they stay observable in logs without ever alarming.
//!
//! Ordering across *different* event types is not commutative: a renewal
//! failure followed by a success ends `active`, the reverse order ends
//! `past_due`. Providers deliver in causal order per subscription, so this
//! is a documented property of the machine, not a defect.

use crate::domain::foundation::Timestamp;

use super::{MembershipOrigin, MembershipRecord, MembershipStatus, PaymentEvent};

/// Length of one prepaid membership term.
pub const MEMBERSHIP_TERM_DAYS: i64 = 365;

/// What the store should do with the computed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No row existed; create one.
    Insert(MembershipRecord),

    /// Replace the current row (version-checked by the store).
    Update(MembershipRecord),

    /// The event was already applied; leave the row untouched.
    Noop,
}

/// Reconciliation result reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Membership activated (first purchase or re-purchase).
    Activated,

    /// Prepaid term extended by a cycle renewal.
    Renewed,

    /// Renewal charge failed; record marked past due.
    RenewalMarkedFailed,

    /// Cancellation recorded; access lapses at the existing expiry.
    Canceled,

    /// Redelivery of an already-applied event. A success, logged as a no-op.
    DuplicateIgnored,

    /// Contact unlock written to the ledger.
    UnlockRecorded,

    /// Unlock already present under its natural key. A success.
    UnlockAlreadyRecorded,

    /// Recognized notification with no state to change.
    Unsupported,
}

impl ReconcileOutcome {
    /// Short name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Activated => "activated",
            ReconcileOutcome::Renewed => "renewed",
            ReconcileOutcome::RenewalMarkedFailed => "renewal_marked_failed",
            ReconcileOutcome::Canceled => "canceled",
            ReconcileOutcome::DuplicateIgnored => "duplicate_ignored",
            ReconcileOutcome::UnlockRecorded => "unlock_recorded",
            ReconcileOutcome::UnlockAlreadyRecorded => "unlock_already_recorded",
            ReconcileOutcome::Unsupported => "unsupported",
        }
    }
}

/// Compute the membership transition for a normalized event.
///
/// `current` is the stored record found under the event's key (driver id
/// for activations, subscription ref otherwise), or `None` when no row
/// exists. `UnlockRequested` is not a membership event and must not be
/// passed here; it goes to the unlock ledger instead.
///
/// # Panics
///
/// Debug builds assert that every produced update is a legal status-machine
/// transition.
pub fn apply_event(
    current: Option<&MembershipRecord>,
    event: &PaymentEvent,
    now: Timestamp,
) -> (Transition, ReconcileOutcome) {
    let (transition, outcome) = match event {
        PaymentEvent::ActivationRequested {
            driver_id,
            subscription_ref,
            valid_from,
        } => match current {
            None => (
                Transition::Insert(MembershipRecord {
                    driver_id: driver_id.clone(),
                    status: MembershipStatus::Active,
                    origin: MembershipOrigin::Paid,
                    subscription_ref: Some(subscription_ref.clone()),
                    expires_at: valid_from.add_days(MEMBERSHIP_TERM_DAYS),
                    updated_at: now,
                    version: 1,
                }),
                ReconcileOutcome::Activated,
            ),
            // Same ref: the checkout notification and the synchronous
            // confirmation both reported this purchase. Strict no-op, even
            // if a later event moved the record on.
            Some(cur) if cur.has_subscription_ref(subscription_ref) => {
                (Transition::Noop, ReconcileOutcome::DuplicateIgnored)
            }
            Some(cur) => {
                let target = valid_from.add_days(MEMBERSHIP_TERM_DAYS);
                let expires_at = match cur.status {
                    // Re-purchase after cancellation starts a fresh term.
                    MembershipStatus::Canceled => target,
                    // A superseding purchase never shortens access the
                    // driver already earned.
                    MembershipStatus::Active | MembershipStatus::PastDue => {
                        cur.expires_at.max(target)
                    }
                };
                (
                    Transition::Update(MembershipRecord {
                        status: MembershipStatus::Active,
                        subscription_ref: Some(subscription_ref.clone()),
                        expires_at,
                        updated_at: now,
                        ..cur.clone()
                    }),
                    ReconcileOutcome::Activated,
                )
            }
        },

        PaymentEvent::RenewalSucceeded { period_anchor, .. } => match current {
            None => unreachable!("caller resolves the subscription ref before applying"),
            // Redelivery detection: the first application pushed expiry past
            // anchor + TERM, so seeing that again means this invoice was
            // already absorbed.
            Some(cur)
                if cur.status == MembershipStatus::Active
                    && cur.expires_at >= period_anchor.add_days(MEMBERSHIP_TERM_DAYS) =>
            {
                (Transition::Noop, ReconcileOutcome::DuplicateIgnored)
            }
            Some(cur) => {
                // A renewal processed before expiry extends the remaining
                // term; one processed after lapse starts fresh from now.
                let base = cur.expires_at.max(now);
                (
                    Transition::Update(MembershipRecord {
                        status: MembershipStatus::Active,
                        expires_at: base.add_days(MEMBERSHIP_TERM_DAYS),
                        updated_at: now,
                        ..cur.clone()
                    }),
                    ReconcileOutcome::Renewed,
                )
            }
        },

        PaymentEvent::RenewalFailed { .. } => match current {
            None => unreachable!("caller resolves the subscription ref before applying"),
            Some(cur) if cur.status == MembershipStatus::Active => (
                Transition::Update(MembershipRecord {
                    status: MembershipStatus::PastDue,
                    updated_at: now,
                    ..cur.clone()
                }),
                ReconcileOutcome::RenewalMarkedFailed,
            ),
            // Already past due or canceled: nothing left to mark.
            Some(_) => (Transition::Noop, ReconcileOutcome::DuplicateIgnored),
        },

        PaymentEvent::CancellationRequested { .. } => match current {
            None => unreachable!("caller resolves the subscription ref before applying"),
            Some(cur) if cur.status == MembershipStatus::Canceled => {
                (Transition::Noop, ReconcileOutcome::DuplicateIgnored)
            }
            // Access lapses naturally at expiry, matching the prepaid-term
            // contract; expires_at stays untouched.
            Some(cur) => (
                Transition::Update(MembershipRecord {
                    status: MembershipStatus::Canceled,
                    updated_at: now,
                    ..cur.clone()
                }),
                ReconcileOutcome::Canceled,
            ),
        },

        PaymentEvent::UnlockRequested { .. } => {
            unreachable!("unlock events are written to the ledger, not the membership record")
        }
    };

    #[cfg(debug_assertions)]
    if let (Some(cur), Transition::Update(next)) = (current, &transition) {
        use crate::domain::foundation::StateMachine;
        debug_assert!(
            cur.status.can_transition_to(&next.status),
            "illegal transition {:?} -> {:?}",
            cur.status,
            next.status
        );
    }

    (transition, outcome)
}
