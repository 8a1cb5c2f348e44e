//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::token::AuthError;
use engine::EstimateError;
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
///
/// The client-facing variants stay distinguishable because they have
/// different remediation paths: re-login, complete the profile, or fix
/// the birthdate.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Not authenticated, or the credential is invalid or expired
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The profile cannot produce an estimate
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    /// Database error, passed through opaquely
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::Auth(err) => (StatusCode::UNAUTHORIZED, err.to_string()),
            ApiError::Estimate(EstimateError::NonPositiveLifeExpectancy) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            ApiError::Estimate(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
