use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::scoring::{PlayerId, WinLossDraw};

/// Database model for the matches table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct MatchModel {
    pub id: i64,
    pub event_id: i64,
    pub round: Option<String>,
    pub winner_id: Option<PlayerId>, // Declared by an admin, never derived from songs
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One player's result on one song slot of a match
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct PlayerScoreModel {
    pub match_id: i64,
    pub song_id: i64,
    pub chart_id: Option<i64>,
    pub song_order: Option<i32>,
    pub player_id: PlayerId,
    pub score: Option<i64>,
    pub win: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct MatchPlayerStatModel {
    pub match_id: i64,
    pub player_id: PlayerId,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
}

/// Fully validated write for a match and all of its child rows
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub event_id: i64,
    pub round: Option<String>,
    pub winner_id: Option<PlayerId>,
    pub created_by: Option<i64>,
    pub participants: Vec<PlayerId>,
    pub scores: Vec<NewPlayerScore>,
    pub stats: Vec<(PlayerId, WinLossDraw)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlayerScore {
    pub song_id: i64,
    pub chart_id: Option<i64>,
    pub song_order: i32,
    pub player_id: PlayerId,
    pub score: Option<i64>,
    pub win: bool,
}

impl NewPlayerScore {
    pub fn to_model(&self, match_id: i64) -> PlayerScoreModel {
        PlayerScoreModel {
            match_id,
            song_id: self.song_id,
            chart_id: self.chart_id,
            song_order: Some(self.song_order),
            player_id: self.player_id,
            score: self.score,
            win: self.win,
        }
    }
}

/// Builds the stored stat row for one participant
pub fn stat_model(
    match_id: i64,
    player_id: PlayerId,
    record: &WinLossDraw,
) -> MatchPlayerStatModel {
    MatchPlayerStatModel {
        match_id,
        player_id,
        wins: i64::from(record.wins),
        losses: i64::from(record.losses),
        draws: i64::from(record.draws),
    }
}
