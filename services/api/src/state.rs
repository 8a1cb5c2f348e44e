//! Application state shared across handlers

use common::token::TokenService;
use sqlx::PgPool;

use crate::repositories::ProfileRepository;

/// Application state shared across handlers
///
/// The token service is built once at startup from injected
/// configuration; handlers and middleware never load the secret
/// themselves.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub profile_repository: ProfileRepository,
    pub token_service: TokenService,
}
