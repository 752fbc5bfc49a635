//! Entitlement bounded context.
//!
//! Owns the membership record, the reconciliation state machine, the
//! payment-event vocabulary, and the contact-unlock ledger entry. The
//! marketplace directory (profiles, search, OTP identity) is an external
//! collaborator; only paid-access state lives here.

mod errors;
mod event;
mod normalizer;
mod record;
mod status;
mod transition;
mod unlock;
mod verifier;

pub use errors::{NormalizeError, ReconcileError, VerifyError};
pub use event::{PaymentEvent, RenewalKind};
pub use normalizer::{
    normalize_confirmation, normalize_provider_event, CheckoutConfirmation, ProviderEvent,
    ProviderEventKind,
};
pub use record::{MembershipOrigin, MembershipRecord};
pub use status::MembershipStatus;
pub use transition::{apply_event, ReconcileOutcome, Transition, MEMBERSHIP_TERM_DAYS};
pub use unlock::{ChargeStatus, ContactUnlock};
pub use verifier::{sign_test_payload, PaymentWebhookVerifier, SignatureHeader};
