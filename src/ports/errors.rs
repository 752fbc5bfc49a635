//! Error types shared by the ports.

use thiserror::Error;

/// Errors from the durable stores.
///
/// Storage unavailability is the only retryable failure in the system; it
/// bubbles unmodified to the boundary, which alone decides the HTTP status.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the operation failed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be mapped back into a domain type.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Errors from external collaborator reads (referral counts, eligibility).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The collaborator could not be reached.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered with something unusable.
    #[error("collaborator returned invalid data: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_displays_cause() {
        let err = StoreError::Unavailable("pool timed out".to_string());
        assert_eq!(format!("{}", err), "storage unavailable: pool timed out");
    }

    #[test]
    fn collaborator_error_displays_cause() {
        let err = CollaboratorError::Unavailable("connection refused".to_string());
        assert_eq!(
            format!("{}", err),
            "collaborator unavailable: connection refused"
        );
    }
}
