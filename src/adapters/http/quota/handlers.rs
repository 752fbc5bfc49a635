//! HTTP handlers for the quota endpoints.
//!
//! Denials are decision bodies with status 200: the driver being out of
//! quota is an answer, not a transport failure.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::adapters::http::{ApiError, AppState, AuthenticatedDriver};
use crate::domain::foundation::Timestamp;

use super::dto::QuotaDecisionResponse;

/// POST /api/quota/reserve - check eligibility, compute the tier, and
/// reserve one fare-calculator run if the monthly allowance permits.
pub async fn reserve_quota(
    State(state): State<AppState>,
    driver: AuthenticatedDriver,
) -> Result<impl IntoResponse, ApiError> {
    let decision = state
        .check_and_reserve_handler()
        .handle(&driver.driver_id, Timestamp::now())
        .await?;

    Ok(Json(QuotaDecisionResponse::from(decision)))
}

/// GET /api/quota - quota snapshot without consuming a unit.
pub async fn get_quota_status(
    State(state): State<AppState>,
    driver: AuthenticatedDriver,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .quota_status_handler()
        .handle(&driver.driver_id, Timestamp::now())
        .await?;

    Ok(Json(view))
}
