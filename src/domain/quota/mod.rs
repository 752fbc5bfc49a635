//! Quota bounded context.
//!
//! Computes the referral-based allowance tier for the metered fare
//! calculator and the calendar-month bucket its usage counts against.
//! Enforcement lives in the application layer; everything here is pure.

mod decision;
mod period;
mod tier;

pub use decision::{DenialReason, QuotaDecision};
pub use period::PeriodKey;
pub use tier::QuotaTier;
