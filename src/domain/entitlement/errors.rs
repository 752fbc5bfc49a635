//! Error types for event normalization and reconciliation.
//!
//! The split matters at the boundary: non-retryable errors must surface as
//! 4xx so the provider's redelivery machinery gets a definitive signal,
//! while retryable ones surface as 5xx and are redelivered.

use thiserror::Error;

use crate::ports::StoreError;

/// Errors from webhook signature verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Signature comparison failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp is older than the replay window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signed timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the signature header.
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Errors from normalizing an inbound payload into a `PaymentEvent`.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A required correlation field is absent. Non-retryable: redelivering
    /// the same payload can never succeed.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Payload did not parse as the expected shape. Non-retryable.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// Recognized but intentionally unhandled notification (not an error;
    /// acknowledged so the provider stops redelivering).
    #[error("Unsupported event: {0}")]
    Unsupported(String),
}

/// Errors from applying a normalized event.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The event could not be normalized.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// A renewal/cancellation notice referenced a subscription with no
    /// record. Retryable: the correlated activation may still be in flight
    /// on the other delivery channel.
    #[error("No membership for subscription {0}")]
    SubscriptionNotFound(String),

    /// Concurrent writers kept invalidating our read; retry exhausted.
    #[error("Write contention on {0}")]
    WriteContention(String),

    /// Storage failed. Retryable.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ReconcileError {
    /// Returns true if the provider should redeliver this event.
    ///
    /// Retryable errors are temporary: storage unavailability, write races,
    /// and activation/renewal delivery ordering across channels.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReconcileError::SubscriptionNotFound(_)
                | ReconcileError::WriteContention(_)
                | ReconcileError::Storage(_)
        )
    }
}
