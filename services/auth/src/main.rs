use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod models;
mod repositories;
mod routes;
mod validation;

use common::database::{DatabaseConfig, health_check, init_pool};
use common::token::{TokenConfig, TokenService};
use sqlx::PgPool;

use crate::repositories::UserRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub token_service: TokenService,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting authentication service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // The signing secret is loaded once here and injected; no handler
    // reads it ambiently.
    let token_config = TokenConfig::from_env()?;
    let token_service = TokenService::new(&token_config);

    let user_repository = UserRepository::new(pool.clone());

    info!("Authentication service initialized successfully");

    let app_state = AppState {
        db_pool: pool,
        user_repository,
        token_service,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Authentication service listening on 0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
