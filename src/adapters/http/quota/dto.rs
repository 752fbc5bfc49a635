//! Response DTOs for the quota endpoints.

use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::domain::quota::{DenialReason, QuotaDecision, QuotaTier};

/// Flat wire form of a `QuotaDecision`.
#[derive(Debug, Serialize)]
pub struct QuotaDecisionResponse {
    pub decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<QuotaTier>,
    /// Present (possibly null) only for allowed decisions; null means
    /// unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resets_at: Option<Timestamp>,
}

impl From<QuotaDecision> for QuotaDecisionResponse {
    fn from(decision: QuotaDecision) -> Self {
        match decision {
            QuotaDecision::Allowed { tier, remaining } => Self {
                decision: "allowed",
                tier: Some(tier),
                remaining: Some(remaining),
                reason: None,
                limit: None,
                resets_at: None,
            },
            QuotaDecision::Denied { reason } => match reason {
                DenialReason::NotEligible => Self {
                    decision: "denied",
                    tier: None,
                    remaining: None,
                    reason: Some("not_eligible"),
                    limit: None,
                    resets_at: None,
                },
                DenialReason::QuotaExceeded { limit, resets_at } => Self {
                    decision: "denied",
                    tier: None,
                    remaining: None,
                    reason: Some("quota_exceeded"),
                    limit: Some(limit),
                    resets_at: Some(resets_at),
                },
            },
        }
    }
}
