//! Quota handlers.

mod check_and_reserve;
mod quota_status;

pub use check_and_reserve::CheckAndReserveQuotaHandler;
pub use quota_status::{QuotaStatusHandler, QuotaStatusView};

use thiserror::Error;

use crate::ports::{CollaboratorError, StoreError};

/// Failures while answering a quota request. Business denials are not
/// errors; they travel inside `QuotaDecision`.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// The entitlement store or usage counter failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The directory collaborator (referrals, eligibility) failed.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
