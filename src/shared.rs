use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::auth::{
    repository::{InMemoryUserRepository, UserRepository},
    token::TokenConfig,
};
use crate::event::repository::{EventRepository, InMemoryEventRepository};
use crate::event_player::repository::{EventPlayerRepository, InMemoryEventPlayerRepository};
use crate::matches::repository::{InMemoryMatchRepository, MatchRepository};
use crate::player::repository::{InMemoryPlayerRepository, PlayerRepository};
use crate::song::repository::{InMemorySongRepository, SongRepository};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub event_repository: Arc<dyn EventRepository + Send + Sync>,
    pub player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    pub event_player_repository: Arc<dyn EventPlayerRepository + Send + Sync>,
    pub song_repository: Arc<dyn SongRepository + Send + Sync>,
    pub match_repository: Arc<dyn MatchRepository + Send + Sync>,
    pub token_config: TokenConfig,
}

impl AppState {
    /// State over fresh in-memory repositories, for development without a database
    pub fn in_memory(token_config: TokenConfig) -> Self {
        Self {
            user_repository: Arc::new(InMemoryUserRepository::new()),
            event_repository: Arc::new(InMemoryEventRepository::new()),
            player_repository: Arc::new(InMemoryPlayerRepository::new()),
            event_player_repository: Arc::new(InMemoryEventPlayerRepository::new()),
            song_repository: Arc::new(InMemorySongRepository::new()),
            match_repository: Arc::new(InMemoryMatchRepository::new()),
            token_config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate resource; carries the existing record when the caller should see it
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        existing: Option<serde_json::Value>,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict {
            message: message.into(),
            existing: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            AppError::Token(msg) => (StatusCode::UNAUTHORIZED, json!({ "message": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "message": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            AppError::Conflict { message, existing } => {
                let mut body = json!({ "message": message });
                if let Some(existing) = existing {
                    body["existing"] = existing;
                }
                (StatusCode::CONFLICT, body)
            }
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": format!("Database error: {}", msg) }),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Builds a `map_err` adapter that logs a store failure and wraps it as `DatabaseError`
pub fn database_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, operation, "Database operation failed");
        AppError::DatabaseError(e.to_string())
    }
}

pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Deserializer for partial updates: a field that is present (even as `null`)
/// becomes `Some(..)`; pair with `#[serde(default)]` so an absent field stays `None`.
pub fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

/// Standard body for successful deletions
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
