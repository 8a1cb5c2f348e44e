use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;

use common::database::{DatabaseConfig, health_check, init_pool};
use common::token::{TokenConfig, TokenService};

use crate::{repositories::ProfileRepository, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Same shared secret as the auth service, loaded once.
    let token_config = TokenConfig::from_env()?;
    let token_service = TokenService::new(&token_config);

    let profile_repository = ProfileRepository::new(pool.clone());

    info!("API service initialized successfully");

    let app_state = AppState {
        db_pool: pool,
        profile_repository,
        token_service,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
    info!("API service listening on 0.0.0.0:3001");

    axum::serve(listener, app).await?;

    Ok(())
}
