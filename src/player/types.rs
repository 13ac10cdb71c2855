use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{NewPlayer, PlayerChanges, PlayerModel};
use crate::shared::{present, AppError};

#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub gamertag: Option<String>,
    pub pronouns: Option<String>,
}

impl CreatePlayerRequest {
    pub fn into_new_player(self, user_id: Option<i64>) -> Result<NewPlayer, AppError> {
        let gamertag = clean(self.gamertag)
            .ok_or_else(|| AppError::Validation("Gamertag is required".to_string()))?;

        Ok(NewPlayer {
            gamertag,
            pronouns: clean(self.pronouns),
            user_id,
        })
    }
}

/// Partial update. An explicit `"pronouns": null` clears the field,
/// leaving it out keeps the stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlayerRequest {
    pub gamertag: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub pronouns: Option<Option<String>>,
}

impl TryFrom<UpdatePlayerRequest> for PlayerChanges {
    type Error = AppError;

    fn try_from(request: UpdatePlayerRequest) -> Result<Self, Self::Error> {
        let gamertag = match request.gamertag {
            Some(raw) => Some(
                clean(Some(raw))
                    .ok_or_else(|| AppError::Validation("Gamertag cannot be empty".to_string()))?,
            ),
            None => None,
        };

        Ok(PlayerChanges {
            gamertag,
            pronouns: request.pronouns.map(clean),
        })
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerResponse {
    pub player_id: i64,
    pub gamertag: String,
    pub pronouns: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<PlayerModel> for PlayerResponse {
    fn from(player: PlayerModel) -> Self {
        Self {
            player_id: player.id,
            gamertag: player.gamertag,
            pronouns: player.pronouns,
            user_id: player.user_id,
            created_at: player.created_at,
        }
    }
}
