//! API error mapping.
//!
//! The status code is the retry signal for the provider's webhook
//! machinery: 2xx acknowledges, 4xx is definitive (no redelivery), 5xx
//! triggers redelivery. Only the boundary decides status codes; inner
//! layers report what went wrong, not how to answer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::handlers::quota::QuotaError;
use crate::domain::entitlement::{NormalizeError, ReconcileError, VerifyError};
use crate::ports::{CollaboratorError, StoreError};

/// Standard error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Failures surfaced by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Signature header absent.
    MissingSignature,

    /// Signature verification failed.
    Verify(VerifyError),

    /// Event application failed.
    Reconcile(ReconcileError),

    /// Quota computation failed.
    Quota(QuotaError),

    /// Direct store read failed.
    Store(StoreError),
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        ApiError::Verify(err)
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        ApiError::Reconcile(err)
    }
}

impl From<QuotaError> for ApiError {
    fn from(err: QuotaError) -> Self {
        ApiError::Quota(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::MissingSignature => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("MISSING_SIGNATURE", "Webhook signature header is required"),
            ),

            ApiError::Verify(err) => match err {
                VerifyError::InvalidSignature | VerifyError::TimestampOutOfRange => (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("INVALID_SIGNATURE", err.to_string()),
                ),
                VerifyError::InvalidTimestamp | VerifyError::ParseError(_) => (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("INVALID_SIGNATURE_HEADER", err.to_string()),
                ),
            },

            ApiError::Reconcile(err) => match err {
                // Definitive: redelivering the same payload cannot succeed.
                ReconcileError::Normalize(
                    NormalizeError::MissingField(_) | NormalizeError::Malformed(_),
                ) => (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("MALFORMED_EVENT", err.to_string()),
                ),
                // Handlers acknowledge unsupported events before erroring;
                // this arm only exists so the mapping stays total.
                ReconcileError::Normalize(NormalizeError::Unsupported(_)) => (
                    StatusCode::OK,
                    ErrorResponse::new("UNSUPPORTED_EVENT", err.to_string()),
                ),
                // Retryable: redelivery converges once the race settles.
                ReconcileError::SubscriptionNotFound(_)
                | ReconcileError::WriteContention(_)
                | ReconcileError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("RETRYABLE", err.to_string()),
                ),
            },

            ApiError::Quota(err) => match err {
                QuotaError::Storage(inner) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("STORAGE_ERROR", inner.to_string()),
                ),
                QuotaError::Collaborator(CollaboratorError::Unavailable(msg)) => (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new("DIRECTORY_UNAVAILABLE", msg.clone()),
                ),
                QuotaError::Collaborator(CollaboratorError::InvalidResponse(msg)) => (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new("DIRECTORY_INVALID_RESPONSE", msg.clone()),
                ),
            },

            ApiError::Store(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("STORAGE_ERROR", err.to_string()),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(error = %body.message, code = %body.error, "request failed");
        } else {
            tracing::warn!(error = %body.message, code = %body.error, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_event_maps_to_400() {
        let err = ApiError::Reconcile(ReconcileError::Normalize(NormalizeError::MissingField(
            "subscription",
        )));
        assert_eq!(err.status_and_body().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn retryable_errors_map_to_5xx() {
        let err = ApiError::Reconcile(ReconcileError::SubscriptionNotFound("sub_1".to_string()));
        assert!(err.status_and_body().0.is_server_error());

        let err = ApiError::Reconcile(ReconcileError::Storage(StoreError::Unavailable(
            "down".to_string(),
        )));
        assert!(err.status_and_body().0.is_server_error());
    }

    #[test]
    fn signature_failures_map_to_401() {
        let err = ApiError::Verify(VerifyError::InvalidSignature);
        assert_eq!(err.status_and_body().0, StatusCode::UNAUTHORIZED);

        assert_eq!(
            ApiError::MissingSignature.status_and_body().0,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn collaborator_failure_maps_to_502() {
        let err = ApiError::Quota(QuotaError::Collaborator(CollaboratorError::Unavailable(
            "down".to_string(),
        )));
        assert_eq!(err.status_and_body().0, StatusCode::BAD_GATEWAY);
    }
}
