//! API service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use engine::{Profile, ProfileUpdate, estimate};
use serde_json::json;

use crate::{
    error::ApiError,
    middleware::{AuthUser, auth_middleware},
    models::{EstimateResponse, ProfileResponse},
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/user/profile", get(get_profile).put(update_profile))
        .route("/user/life-expectancy", get(life_expectancy))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Get the authenticated user's profile
///
/// A user who has never saved a profile gets an empty one back; a partial
/// profile is a valid state.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .profile_repository
        .get(user.id)
        .await?
        .unwrap_or_default();

    Ok(Json(ProfileResponse {
        user_id: user.id,
        profile,
    }))
}

/// Update the authenticated user's profile
///
/// Omitted fields retain their prior value; lifestyle sub-fields merge
/// independently. The merged snapshot replaces the stored one in full.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let merged = state.profile_repository.update(user.id, &payload).await?;

    Ok(Json(ProfileResponse {
        user_id: user.id,
        profile: merged,
    }))
}

/// Calculate the authenticated user's life expectancy
///
/// Recomputed from the current profile and wall clock on every call;
/// nothing is cached server-side.
pub async fn life_expectancy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let profile: Profile = state
        .profile_repository
        .get(user.id)
        .await?
        .unwrap_or_default();

    let estimate = estimate(&profile, Utc::now())?;

    Ok(Json(EstimateResponse::from(&estimate)))
}
