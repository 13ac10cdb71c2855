use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the songs table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct SongModel {
    pub id: i64,
    pub title: String,
    pub artist: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database model for the charts table; a chart is one playable difficulty of a song
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ChartModel {
    pub id: i64,
    pub song_id: i64,
    pub mode: String,
    pub difficulty: i32,
}

impl ChartModel {
    /// e.g. "Wild 24"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.mode, self.difficulty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    pub title: String,
    pub artist: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChart {
    pub mode: String,
    pub difficulty: i32,
}
