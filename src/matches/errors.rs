use thiserror::Error;

use super::scoring::PlayerId;
use crate::shared::AppError;

/// Reasons a match write is rejected before anything is persisted
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Report either per-song scores or player_stats, not both")]
    AmbiguousReport,

    #[error("A match needs at least 2 distinct players, found {found}")]
    TooFewParticipants { found: usize },

    #[error("Song {song_id} has no player scores")]
    EmptySong { song_id: i64 },

    #[error("Player {player_id} appears more than once on song {song_id}")]
    DuplicateSongEntry { song_id: i64, player_id: PlayerId },

    #[error("Song {song_id} is listed more than once at song_order {song_order}")]
    DuplicateSongSlot { song_id: i64, song_order: i32 },

    #[error("Player {player_id} appears more than once in player_stats")]
    DuplicateStat { player_id: PlayerId },

    #[error("Score for player {player_id} on song {song_id} is not an integer: {value}")]
    InvalidScore {
        song_id: i64,
        player_id: PlayerId,
        value: String,
    },

    #[error("Score {score} for player {player_id} on song {song_id} is outside 0..=100000")]
    ScoreOutOfRange {
        song_id: i64,
        player_id: PlayerId,
        score: i64,
    },

    #[error(
        "W-L-D total mismatch for player {player_id}: expected {expected}, got {actual}"
    )]
    TotalMismatch {
        player_id: PlayerId,
        expected: u32,
        actual: u32,
    },
}

impl From<ScoringError> for AppError {
    fn from(error: ScoringError) -> Self {
        AppError::Validation(error.to_string())
    }
}
