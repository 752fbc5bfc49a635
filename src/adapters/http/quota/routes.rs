//! Axum router configuration for quota endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::AppState;

use super::handlers::{get_quota_status, reserve_quota};

/// Quota routes.
///
/// # Routes
/// - `GET /` - snapshot of the current period (no consumption)
/// - `POST /reserve` - check-and-reserve one metered action
pub fn quota_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_quota_status))
        .route("/reserve", post(reserve_quota))
}
