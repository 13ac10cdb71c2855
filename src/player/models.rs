use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the players table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct PlayerModel {
    pub id: i64,
    pub gamertag: String,
    pub pronouns: Option<String>,
    pub user_id: Option<i64>, // Account that created the player, if any
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlayer {
    pub gamertag: String,
    pub pronouns: Option<String>,
    pub user_id: Option<i64>,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerChanges {
    pub gamertag: Option<String>,
    pub pronouns: Option<Option<String>>,
}
