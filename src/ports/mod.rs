//! Ports - interfaces to storage and external collaborators.
//!
//! Each port is a trait implemented by adapters (PostgreSQL, in-memory,
//! HTTP clients). Handlers depend only on these traits.

mod eligibility_checker;
mod errors;
mod membership_store;
mod referral_source;
mod unlock_ledger;
mod usage_counter_store;

pub use eligibility_checker::EligibilityChecker;
pub use errors::{CollaboratorError, StoreError};
pub use membership_store::{InsertOutcome, MembershipStore, UpdateOutcome};
pub use referral_source::ReferralSource;
pub use unlock_ledger::{RecordOutcome, UnlockLedger};
pub use usage_counter_store::{ReserveOutcome, UsageCounterStore};
