//! Quota HTTP endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::QuotaDecisionResponse;
pub use handlers::{get_quota_status, reserve_quota};
pub use routes::quota_routes;
