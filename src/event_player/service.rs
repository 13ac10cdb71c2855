use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{EventPlayerChanges, NewEventPlayer},
    repository::EventPlayerRepository,
    types::{
        AddEventPlayerRequest, EventPlayerResponse, RemoveEventPlayerResponse,
        UpdateEventPlayerRequest,
    },
};
use crate::event::repository::EventRepository;
use crate::matches::repository::MatchRepository;
use crate::player::repository::PlayerRepository;
use crate::shared::{AppError, AppState};

fn event_player_not_found() -> AppError {
    AppError::NotFound("Event player not found".to_string())
}

/// Service for entering players into events
pub struct EventPlayerService {
    repository: Arc<dyn EventPlayerRepository + Send + Sync>,
    event_repository: Arc<dyn EventRepository + Send + Sync>,
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    match_repository: Arc<dyn MatchRepository + Send + Sync>,
}

impl EventPlayerService {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            repository: Arc::clone(&state.event_player_repository),
            event_repository: Arc::clone(&state.event_repository),
            player_repository: Arc::clone(&state.player_repository),
            match_repository: Arc::clone(&state.match_repository),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn add_player_to_event(
        &self,
        request: AddEventPlayerRequest,
    ) -> Result<EventPlayerResponse, AppError> {
        let entry = NewEventPlayer::try_from(request)?;

        if self.event_repository.get_event(entry.event_id).await?.is_none() {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        if self.player_repository.get_player(entry.player_id).await?.is_none() {
            return Err(AppError::NotFound("Player not found".to_string()));
        }
        if let Some(existing) = self
            .repository
            .find_event_player(entry.event_id, entry.player_id)
            .await?
        {
            return Err(AppError::Conflict {
                message: "Player is already in this event".to_string(),
                existing: serde_json::to_value(EventPlayerResponse::from(existing)).ok(),
            });
        }

        let created = self.repository.add_event_player(&entry).await?;
        info!(
            event_player_id = created.id,
            event_id = created.event_id,
            player_id = created.player_id,
            "Player added to event"
        );
        Ok(created.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update_event_player(
        &self,
        id: i64,
        request: UpdateEventPlayerRequest,
    ) -> Result<EventPlayerResponse, AppError> {
        let changes = EventPlayerChanges::from(request);
        self.repository
            .update_event_player(id, &changes)
            .await?
            .map(EventPlayerResponse::from)
            .ok_or_else(event_player_not_found)
    }

    /// Removes the entry and deletes the player if they are in no other event
    /// and have never played a match
    #[instrument(skip(self))]
    pub async fn remove_player_from_event(
        &self,
        id: i64,
    ) -> Result<RemoveEventPlayerResponse, AppError> {
        let removed = self
            .repository
            .remove_event_player(id)
            .await?
            .ok_or_else(event_player_not_found)?;

        let remaining = self.repository.count_by_player(removed.player_id).await?;
        let has_history = remaining == 0
            && !self
                .match_repository
                .list_matches_by_player(removed.player_id)
                .await?
                .is_empty();
        if has_history {
            info!(
                player_id = removed.player_id,
                "Player has match history, keeping player record"
            );
        }
        if remaining > 0 || has_history {
            info!(event_player_id = id, "Player removed from event");
            return Ok(RemoveEventPlayerResponse {
                message: "Player removed from event successfully".to_string(),
                player_deleted: false,
            });
        }

        info!(
            player_id = removed.player_id,
            "Player is no longer in any event, deleting player record"
        );
        self.player_repository
            .delete_player(removed.player_id)
            .await?;
        Ok(RemoveEventPlayerResponse {
            message: "Player removed from event successfully and player record deleted"
                .to_string(),
            player_deleted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::models::NewEvent;
    use crate::matches::{models::NewMatch, WinLossDraw};
    use crate::player::models::NewPlayer;
    use crate::shared::test_utils::AppStateBuilder;
    use chrono::NaiveDate;

    async fn seed(state: &AppState) -> (i64, i64, i64) {
        let mut events = Vec::new();
        for name in ["Locals #1", "Locals #2"] {
            let event = state
                .event_repository
                .create_event(&NewEvent {
                    name: name.to_string(),
                    date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
                })
                .await
                .unwrap();
            events.push(event.id);
        }
        let player = state
            .player_repository
            .create_player(&NewPlayer {
                gamertag: "Dogfetus".to_string(),
                pronouns: None,
                user_id: None,
            })
            .await
            .unwrap();
        (events[0], events[1], player.id)
    }

    fn add(event_id: i64, player_id: i64) -> AddEventPlayerRequest {
        AddEventPlayerRequest {
            event_id: Some(event_id),
            player_id: Some(player_id),
            seed: Some(1),
            placement: None,
        }
    }

    #[tokio::test]
    async fn removing_last_entry_deletes_the_player() {
        let state = AppStateBuilder::new().build();
        let (first, second, player_id) = seed(&state).await;
        let service = EventPlayerService::from_state(&state);

        let a = service.add_player_to_event(add(first, player_id)).await.unwrap();
        let b = service.add_player_to_event(add(second, player_id)).await.unwrap();

        let response = service
            .remove_player_from_event(a.event_player_id)
            .await
            .unwrap();
        assert!(!response.player_deleted);
        assert!(state.player_repository.get_player(player_id).await.unwrap().is_some());

        let response = service
            .remove_player_from_event(b.event_player_id)
            .await
            .unwrap();
        assert!(response.player_deleted);
        assert!(state.player_repository.get_player(player_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn player_with_match_history_survives_losing_last_entry() {
        let state = AppStateBuilder::new().build();
        let (first, _, player_id) = seed(&state).await;
        let rival = state
            .player_repository
            .create_player(&NewPlayer {
                gamertag: "Rival".to_string(),
                pronouns: None,
                user_id: None,
            })
            .await
            .unwrap();
        state
            .match_repository
            .create_match(&NewMatch {
                event_id: first,
                round: None,
                winner_id: Some(player_id),
                created_by: None,
                participants: vec![player_id, rival.id],
                scores: Vec::new(),
                stats: vec![
                    (player_id, WinLossDraw::new(1, 0, 0)),
                    (rival.id, WinLossDraw::new(0, 1, 0)),
                ],
            })
            .await
            .unwrap();

        let service = EventPlayerService::from_state(&state);
        let entry = service.add_player_to_event(add(first, player_id)).await.unwrap();

        let response = service
            .remove_player_from_event(entry.event_player_id)
            .await
            .unwrap();
        assert!(!response.player_deleted);
        assert!(state.player_repository.get_player(player_id).await.unwrap().is_some());
        assert_eq!(
            state
                .event_player_repository
                .count_by_player(player_id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn duplicate_entry_conflicts_and_unknown_ids_are_not_found() {
        let state = AppStateBuilder::new().build();
        let (first, _, player_id) = seed(&state).await;
        let service = EventPlayerService::from_state(&state);

        service.add_player_to_event(add(first, player_id)).await.unwrap();
        assert!(matches!(
            service.add_player_to_event(add(first, player_id)).await,
            Err(AppError::Conflict { existing: Some(_), .. })
        ));
        assert!(matches!(
            service.add_player_to_event(add(first, 404)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.add_player_to_event(add(404, player_id)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.remove_player_from_event(999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let state = AppStateBuilder::new().build();
        let (first, _, player_id) = seed(&state).await;
        let service = EventPlayerService::from_state(&state);
        let created = service.add_player_to_event(add(first, player_id)).await.unwrap();

        let updated = service
            .update_event_player(
                created.event_player_id,
                UpdateEventPlayerRequest {
                    seed: None,
                    placement: Some(Some(3)),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.seed, Some(1));
        assert_eq!(updated.placement, Some(3));
    }
}
