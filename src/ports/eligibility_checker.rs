//! Eligibility checker port.
//!
//! Role management is the directory's concern; the quota engine only needs
//! a yes/no answer to "may this subject use the metered feature at all".

use async_trait::async_trait;

use crate::domain::foundation::DriverId;

use super::CollaboratorError;

/// Port for the role/eligibility gate on the metered feature.
#[async_trait]
pub trait EligibilityChecker: Send + Sync {
    /// True if the subject holds a role that may use the fare calculator.
    async fn is_eligible(&self, driver_id: &DriverId) -> Result<bool, CollaboratorError>;
}
