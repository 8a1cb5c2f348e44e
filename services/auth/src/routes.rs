//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use common::token::AuthError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    AppState,
    models::NewUser,
    repositories::UserRepositoryError,
    validation::{validate_email, validate_password},
};

/// Request for user registration and login
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Response carrying an issued credential
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User registration endpoint
///
/// Creates the identity and issues a credential. The profile starts
/// empty; registration never creates one.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, RouteError> {
    info!("Registration attempt for: {}", payload.email);

    validate_email(&payload.email).map_err(RouteError::Validation)?;
    validate_password(&payload.password).map_err(RouteError::Validation)?;

    let new_user = NewUser {
        email: payload.email,
        password: payload.password,
    };

    let user = state.user_repository.create(&new_user).await?;

    let token = state
        .token_service
        .issue(user.id, Utc::now())
        .map_err(|e| {
            error!("Failed to issue token: {}", e);
            RouteError::Internal
        })?;

    let response = TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.token_service.token_expiry(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
///
/// Verifies the password and issues a fresh credential. Login has no
/// effect on the stored user or profile.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, RouteError> {
    info!("Login attempt for: {}", payload.email);

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await?
        .ok_or(RouteError::BadCredentials)?;

    if !state
        .user_repository
        .verify_password(&user, &payload.password)?
    {
        return Err(RouteError::BadCredentials);
    }

    let token = state
        .token_service
        .issue(user.id, Utc::now())
        .map_err(|e| {
            error!("Failed to issue token: {}", e);
            RouteError::Internal
        })?;

    let response = TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.token_service.token_expiry(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Route-level error type for the authentication service
#[derive(Error, Debug)]
pub enum RouteError {
    /// Email or password failed validation
    #[error("{0}")]
    Validation(String),

    /// Unknown email or wrong password; intentionally undifferentiated
    #[error("Invalid email or password")]
    BadCredentials,

    /// Registration handle already taken
    #[error("Email already registered")]
    DuplicateIdentity,

    /// Everything the client cannot remediate
    #[error("Internal server error")]
    Internal,
}

impl From<UserRepositoryError> for RouteError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::Auth(AuthError::DuplicateIdentity) => {
                RouteError::DuplicateIdentity
            }
            other => {
                error!("Repository error: {}", other);
                RouteError::Internal
            }
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = match self {
            RouteError::Validation(_) => StatusCode::BAD_REQUEST,
            RouteError::BadCredentials => StatusCode::UNAUTHORIZED,
            RouteError::DuplicateIdentity => StatusCode::CONFLICT,
            RouteError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
