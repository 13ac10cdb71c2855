use serde::{Deserialize, Serialize};

use super::models::{EventPlayerChanges, EventPlayerModel, NewEventPlayer};
use crate::player::models::PlayerModel;
use crate::shared::{present, AppError};

#[derive(Debug, Deserialize)]
pub struct AddEventPlayerRequest {
    pub event_id: Option<i64>,
    pub player_id: Option<i64>,
    pub seed: Option<i32>,
    #[serde(alias = "place")]
    pub placement: Option<i32>,
}

impl TryFrom<AddEventPlayerRequest> for NewEventPlayer {
    type Error = AppError;

    fn try_from(request: AddEventPlayerRequest) -> Result<Self, Self::Error> {
        match (request.event_id, request.player_id) {
            (Some(event_id), Some(player_id)) => Ok(NewEventPlayer {
                event_id,
                player_id,
                seed: request.seed,
                placement: request.placement,
            }),
            _ => Err(AppError::Validation(
                "Event ID and Player ID are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventPlayerRequest {
    #[serde(default, deserialize_with = "present")]
    pub seed: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present", alias = "place")]
    pub placement: Option<Option<i32>>,
}

impl From<UpdateEventPlayerRequest> for EventPlayerChanges {
    fn from(request: UpdateEventPlayerRequest) -> Self {
        Self {
            seed: request.seed,
            placement: request.placement,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventPlayerResponse {
    pub event_player_id: i64,
    pub event_id: i64,
    pub player_id: i64,
    pub seed: Option<i32>,
    pub placement: Option<i32>,
}

impl From<EventPlayerModel> for EventPlayerResponse {
    fn from(entry: EventPlayerModel) -> Self {
        Self {
            event_player_id: entry.id,
            event_id: entry.event_id,
            player_id: entry.player_id,
            seed: entry.seed,
            placement: entry.placement,
        }
    }
}

/// Body returned after removing a player from an event
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RemoveEventPlayerResponse {
    pub message: String,
    /// True when the player was in no other event and the player record went too
    pub player_deleted: bool,
}

/// One row of an event roster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterEntry {
    pub event_player_id: i64,
    pub event_id: i64,
    pub player_id: i64,
    pub gamertag: String,
    pub pronouns: Option<String>,
    pub seed: Option<i32>,
    pub placement: Option<i32>,
}

impl RosterEntry {
    pub fn new(entry: EventPlayerModel, player: &PlayerModel) -> Self {
        Self {
            event_player_id: entry.id,
            event_id: entry.event_id,
            player_id: entry.player_id,
            gamertag: player.gamertag.clone(),
            pronouns: player.pronouns.clone(),
            seed: entry.seed,
            placement: entry.placement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_request_accepts_place_alias() {
        let request: AddEventPlayerRequest =
            serde_json::from_str(r#"{"event_id": 1, "player_id": 2, "place": 3}"#).unwrap();
        let entry = NewEventPlayer::try_from(request).unwrap();
        assert_eq!(entry.placement, Some(3));
        assert_eq!(entry.seed, None);

        let request: AddEventPlayerRequest = serde_json::from_str(r#"{"event_id": 1}"#).unwrap();
        assert!(NewEventPlayer::try_from(request).is_err());
    }

    #[test]
    fn update_request_keeps_absent_fields() {
        let request: UpdateEventPlayerRequest =
            serde_json::from_str(r#"{"seed": null}"#).unwrap();
        let changes = EventPlayerChanges::from(request);
        assert_eq!(changes.seed, Some(None));
        assert_eq!(changes.placement, None);
    }
}
