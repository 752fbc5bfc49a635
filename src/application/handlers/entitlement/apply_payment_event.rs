//! ApplyPaymentEventHandler - the reconciler's single write entry point.
//!
//! Called by the webhook handler and the synchronous confirmation handler
//! alike. Membership events go through the pure transition function and an
//! optimistic-concurrency write loop; unlock events go to the ledger, where
//! the natural key absorbs duplicate deliveries.

use std::sync::Arc;

use crate::domain::entitlement::{
    apply_event, ContactUnlock, MembershipRecord, PaymentEvent, ReconcileError, ReconcileOutcome,
    Transition,
};
use crate::domain::foundation::Timestamp;
use crate::ports::{InsertOutcome, MembershipStore, RecordOutcome, UnlockLedger, UpdateOutcome};

/// How many times a lost write race is retried before giving up.
///
/// Each retry re-reads and re-applies the pure transition, so the loop
/// converges as long as writers make progress.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Handler for applying normalized payment events.
pub struct ApplyPaymentEventHandler {
    memberships: Arc<dyn MembershipStore>,
    unlocks: Arc<dyn UnlockLedger>,
}

impl ApplyPaymentEventHandler {
    pub fn new(memberships: Arc<dyn MembershipStore>, unlocks: Arc<dyn UnlockLedger>) -> Self {
        Self {
            memberships,
            unlocks,
        }
    }

    /// Apply one event. Redelivery of an already-applied event returns
    /// `DuplicateIgnored` / `UnlockAlreadyRecorded`, never an error.
    #[tracing::instrument(skip(self, event), fields(event_kind = event.kind()))]
    pub async fn handle(
        &self,
        event: PaymentEvent,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let outcome = match &event {
            PaymentEvent::UnlockRequested {
                driver_id,
                passenger_id,
                amount_cents,
                currency,
                checkout_ref,
                charge,
            } => {
                let unlock = ContactUnlock {
                    driver_id: driver_id.clone(),
                    passenger_id: *passenger_id,
                    amount_cents: *amount_cents,
                    currency: currency.clone(),
                    checkout_ref: checkout_ref.clone(),
                    charge: *charge,
                    recorded_at: now,
                };
                match self.unlocks.record(&unlock).await? {
                    RecordOutcome::Recorded => ReconcileOutcome::UnlockRecorded,
                    RecordOutcome::AlreadyRecorded => ReconcileOutcome::UnlockAlreadyRecorded,
                }
            }
            _ => self.apply_membership_event(&event, now).await?,
        };

        tracing::info!(outcome = outcome.as_str(), "payment event reconciled");
        Ok(outcome)
    }

    async fn apply_membership_event(
        &self,
        event: &PaymentEvent,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        for _attempt in 0..MAX_WRITE_ATTEMPTS {
            let current = self.load_current(event).await?;

            let (transition, outcome) = apply_event(current.as_ref(), event, now);

            match transition {
                Transition::Noop => {
                    tracing::info!(
                        event_kind = event.kind(),
                        "duplicate delivery ignored"
                    );
                    return Ok(outcome);
                }
                Transition::Insert(record) => match self.memberships.insert(&record).await? {
                    InsertOutcome::Inserted => return Ok(outcome),
                    // A concurrent first activation won; re-read so this
                    // delivery collapses to a duplicate.
                    InsertOutcome::AlreadyExists => continue,
                },
                Transition::Update(record) => {
                    match self.memberships.update(&record, record.version).await? {
                        UpdateOutcome::Updated => return Ok(outcome),
                        UpdateOutcome::VersionConflict => continue,
                    }
                }
            }
        }

        Err(ReconcileError::WriteContention(event.kind().to_string()))
    }

    /// Resolve the record the event addresses: activations key on the
    /// driver, everything else on the subscription ref.
    async fn load_current(
        &self,
        event: &PaymentEvent,
    ) -> Result<Option<MembershipRecord>, ReconcileError> {
        match event {
            PaymentEvent::ActivationRequested { driver_id, .. } => {
                Ok(self.memberships.find_by_driver_id(driver_id).await?)
            }
            PaymentEvent::RenewalSucceeded {
                subscription_ref, ..
            }
            | PaymentEvent::RenewalFailed { subscription_ref }
            | PaymentEvent::CancellationRequested { subscription_ref } => {
                match self
                    .memberships
                    .find_by_subscription_ref(subscription_ref)
                    .await?
                {
                    Some(record) => Ok(Some(record)),
                    // The correlated activation may still be in flight on
                    // the other channel; retryable so redelivery converges.
                    None => Err(ReconcileError::SubscriptionNotFound(
                        subscription_ref.clone(),
                    )),
                }
            }
            PaymentEvent::UnlockRequested { .. } => {
                unreachable!("unlock events never reach the membership path")
            }
        }
    }
}
