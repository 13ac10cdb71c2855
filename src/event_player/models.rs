use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the event_players table (a player's entry in an event)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct EventPlayerModel {
    pub id: i64,
    pub event_id: i64,
    pub player_id: i64,
    pub seed: Option<i32>,
    pub placement: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEventPlayer {
    pub event_id: i64,
    pub player_id: i64,
    pub seed: Option<i32>,
    pub placement: Option<i32>,
}

/// Partial update; the outer `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPlayerChanges {
    pub seed: Option<Option<i32>>,
    pub placement: Option<Option<i32>>,
}
