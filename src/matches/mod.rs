// Public API - what other modules can use
pub use errors::ScoringError;
pub use handlers::{
    create_match, delete_match, get_match, get_player_record, list_matches_by_event, update_match,
};
pub use scoring::{compute_wld, determine_song_winner, PlayerId, ScoreEntry, WinLossDraw};
pub use service::MatchService;

pub mod assembler;
mod errors;
mod handlers;
pub mod models;
pub mod repository;
pub mod scoring;
mod service;
pub mod types;
pub mod validation;
