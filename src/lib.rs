// Library crate for the tournament records service
// This file exposes the public API for the binary and integration tests

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod event;
pub mod event_player;
pub mod matches;
pub mod player;
pub mod shared;
pub mod song;

// Re-export commonly used types for easier access in tests
pub use app::build_router;
pub use auth::{token::TokenConfig, AuthService, RequestContext};
pub use config::AppConfig;
pub use matches::{compute_wld, determine_song_winner, ScoreEntry, WinLossDraw};
pub use shared::{AppError, AppState};
