use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{PlayerChanges, PlayerModel},
    repository::PlayerRepository,
    types::{CreatePlayerRequest, PlayerResponse, UpdatePlayerRequest},
};
use crate::event_player::{repository::EventPlayerRepository, types::RosterEntry};
use crate::shared::{AppError, AppState};

fn player_not_found() -> AppError {
    AppError::NotFound("Player not found".to_string())
}

/// Service for handling player business logic
pub struct PlayerService {
    repository: Arc<dyn PlayerRepository + Send + Sync>,
    event_player_repository: Arc<dyn EventPlayerRepository + Send + Sync>,
}

impl PlayerService {
    pub fn new(
        repository: Arc<dyn PlayerRepository + Send + Sync>,
        event_player_repository: Arc<dyn EventPlayerRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            event_player_repository,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.player_repository),
            Arc::clone(&state.event_player_repository),
        )
    }

    #[instrument(skip(self))]
    pub async fn list_players(&self) -> Result<Vec<PlayerResponse>, AppError> {
        let players = self.repository.list_players().await?;
        Ok(players.into_iter().map(PlayerResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_player(&self, player_id: i64) -> Result<PlayerResponse, AppError> {
        self.repository
            .get_player(player_id)
            .await?
            .map(PlayerResponse::from)
            .ok_or_else(player_not_found)
    }

    #[instrument(skip(self))]
    pub async fn get_player_by_gamertag(&self, gamertag: &str) -> Result<PlayerResponse, AppError> {
        self.repository
            .get_player_by_gamertag(gamertag.trim())
            .await?
            .map(PlayerResponse::from)
            .ok_or_else(player_not_found)
    }

    /// Roster for an event ordered by seed then placement
    #[instrument(skip(self))]
    pub async fn list_event_roster(&self, event_id: i64) -> Result<Vec<RosterEntry>, AppError> {
        let entries = self.event_player_repository.list_by_event(event_id).await?;
        let player_ids: Vec<i64> = entries.iter().map(|entry| entry.player_id).collect();
        let players: HashMap<i64, PlayerModel> = self
            .repository
            .get_players_by_ids(&player_ids)
            .await?
            .into_iter()
            .map(|player| (player.id, player))
            .collect();

        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                let player = players.get(&entry.player_id)?;
                Some(RosterEntry::new(entry, player))
            })
            .collect())
    }

    /// Creates a player; a taken gamertag is a conflict carrying the existing player
    #[instrument(skip(self, request))]
    pub async fn create_player(
        &self,
        request: CreatePlayerRequest,
        created_by: Option<i64>,
    ) -> Result<PlayerResponse, AppError> {
        let new_player = request.into_new_player(created_by)?;

        if let Some(existing) = self
            .repository
            .get_player_by_gamertag(&new_player.gamertag)
            .await?
        {
            info!(player_id = existing.id, gamertag = %existing.gamertag, "Gamertag already taken");
            return Err(AppError::Conflict {
                message: "Player with this gamertag already exists".to_string(),
                existing: serde_json::to_value(PlayerResponse::from(existing)).ok(),
            });
        }

        let player = self.repository.create_player(&new_player).await?;
        info!(player_id = player.id, gamertag = %player.gamertag, "Player created");
        Ok(player.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update_player(
        &self,
        player_id: i64,
        request: UpdatePlayerRequest,
    ) -> Result<PlayerResponse, AppError> {
        let changes = PlayerChanges::try_from(request)?;
        let player = self
            .repository
            .update_player(player_id, &changes)
            .await?
            .ok_or_else(player_not_found)?;

        info!(player_id, "Player updated");
        Ok(player.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;

    fn create_request(gamertag: &str) -> CreatePlayerRequest {
        CreatePlayerRequest {
            gamertag: Some(gamertag.to_string()),
            pronouns: None,
        }
    }

    #[tokio::test]
    async fn duplicate_create_returns_existing_player() {
        let state = AppStateBuilder::new().build();
        let service = PlayerService::from_state(&state);
        let first = service.create_player(create_request("JBuck"), Some(1)).await.unwrap();

        match service.create_player(create_request("JBuck"), Some(1)).await {
            Err(AppError::Conflict { existing, .. }) => {
                let existing = existing.unwrap();
                assert_eq!(existing["player_id"], first.player_id);
                assert_eq!(existing["gamertag"], "JBuck");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn roster_joins_gamertags_in_seed_order() {
        use crate::event_player::models::NewEventPlayer;

        let state = AppStateBuilder::new().build();
        let service = PlayerService::from_state(&state);
        let first = service.create_player(create_request("first"), None).await.unwrap();
        let second = service.create_player(create_request("second"), None).await.unwrap();

        for (player_id, seed) in [(second.player_id, 2), (first.player_id, 1)] {
            state
                .event_player_repository
                .add_event_player(&NewEventPlayer {
                    event_id: 5,
                    player_id,
                    seed: Some(seed),
                    placement: None,
                })
                .await
                .unwrap();
        }

        let roster = service.list_event_roster(5).await.unwrap();
        let gamertags: Vec<&str> = roster.iter().map(|r| r.gamertag.as_str()).collect();
        assert_eq!(gamertags, vec!["first", "second"]);
        assert!(service.list_event_roster(6).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn gamertag_lookup_and_missing_player() {
        let state = AppStateBuilder::new().build();
        let service = PlayerService::from_state(&state);
        let created = service.create_player(create_request("Kren"), None).await.unwrap();

        assert_eq!(
            service.get_player_by_gamertag("Kren").await.unwrap(),
            created
        );
        assert!(matches!(
            service.get_player_by_gamertag("nobody").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.update_player(999, UpdatePlayerRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
