use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tracing::info;

use crate::auth::{repository::PostgresUserRepository, token::TokenConfig};
use crate::event::repository::PostgresEventRepository;
use crate::event_player::repository::PostgresEventPlayerRepository;
use crate::matches::repository::PostgresMatchRepository;
use crate::player::repository::PostgresPlayerRepository;
use crate::shared::{database_error, AppError, AppState};
use crate::song::repository::PostgresSongRepository;

/// Connects to PostgreSQL and applies the embedded migrations
pub async fn connect(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(database_error("connect"))?;
    info!("Database connection pool created");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Application state backed by PostgreSQL repositories sharing one pool
pub fn postgres_state(pool: PgPool, token_config: TokenConfig) -> AppState {
    AppState {
        user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
        event_repository: Arc::new(PostgresEventRepository::new(pool.clone())),
        player_repository: Arc::new(PostgresPlayerRepository::new(pool.clone())),
        event_player_repository: Arc::new(PostgresEventPlayerRepository::new(pool.clone())),
        song_repository: Arc::new(PostgresSongRepository::new(pool.clone())),
        match_repository: Arc::new(PostgresMatchRepository::new(pool)),
        token_config,
    }
}
