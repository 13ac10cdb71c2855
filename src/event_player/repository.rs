use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::{EventPlayerChanges, EventPlayerModel, NewEventPlayer};
use crate::shared::{database_error, is_unique_violation, AppError};

/// Trait for event roster repository operations
#[async_trait]
pub trait EventPlayerRepository {
    /// Fails with `Conflict` when the player is already in the event
    async fn add_event_player(&self, entry: &NewEventPlayer)
        -> Result<EventPlayerModel, AppError>;
    async fn get_event_player(&self, id: i64) -> Result<Option<EventPlayerModel>, AppError>;
    async fn find_event_player(
        &self,
        event_id: i64,
        player_id: i64,
    ) -> Result<Option<EventPlayerModel>, AppError>;
    /// Entries of one event ordered by seed then placement, unset values last
    async fn list_by_event(&self, event_id: i64) -> Result<Vec<EventPlayerModel>, AppError>;
    async fn update_event_player(
        &self,
        id: i64,
        changes: &EventPlayerChanges,
    ) -> Result<Option<EventPlayerModel>, AppError>;
    /// Returns the removed entry, if there was one
    async fn remove_event_player(&self, id: i64) -> Result<Option<EventPlayerModel>, AppError>;
    /// Number of events the player is still entered in
    async fn count_by_player(&self, player_id: i64) -> Result<i64, AppError>;
}

#[derive(Default)]
struct EventPlayerStore {
    next_id: i64,
    entries: BTreeMap<i64, EventPlayerModel>,
}

/// In-memory implementation of EventPlayerRepository for development and testing
#[derive(Default)]
pub struct InMemoryEventPlayerRepository {
    store: RwLock<EventPlayerStore>,
}

impl InMemoryEventPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn roster_key(entry: &EventPlayerModel) -> (bool, Option<i32>, bool, Option<i32>, i64) {
    (
        entry.seed.is_none(),
        entry.seed,
        entry.placement.is_none(),
        entry.placement,
        entry.id,
    )
}

#[async_trait]
impl EventPlayerRepository for InMemoryEventPlayerRepository {
    #[instrument(skip(self, entry))]
    async fn add_event_player(
        &self,
        entry: &NewEventPlayer,
    ) -> Result<EventPlayerModel, AppError> {
        let mut store = self.store.write().await;
        if store
            .entries
            .values()
            .any(|e| e.event_id == entry.event_id && e.player_id == entry.player_id)
        {
            return Err(AppError::conflict("Player is already in this event"));
        }

        store.next_id += 1;
        let model = EventPlayerModel {
            id: store.next_id,
            event_id: entry.event_id,
            player_id: entry.player_id,
            seed: entry.seed,
            placement: entry.placement,
        };
        store.entries.insert(model.id, model.clone());

        debug!(event_player_id = model.id, "Event player created in memory");
        Ok(model)
    }

    async fn get_event_player(&self, id: i64) -> Result<Option<EventPlayerModel>, AppError> {
        Ok(self.store.read().await.entries.get(&id).cloned())
    }

    async fn find_event_player(
        &self,
        event_id: i64,
        player_id: i64,
    ) -> Result<Option<EventPlayerModel>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .entries
            .values()
            .find(|e| e.event_id == event_id && e.player_id == player_id)
            .cloned())
    }

    async fn list_by_event(&self, event_id: i64) -> Result<Vec<EventPlayerModel>, AppError> {
        let store = self.store.read().await;
        let mut entries: Vec<EventPlayerModel> = store
            .entries
            .values()
            .filter(|e| e.event_id == event_id)
            .cloned()
            .collect();
        entries.sort_by_key(roster_key);
        Ok(entries)
    }

    #[instrument(skip(self, changes))]
    async fn update_event_player(
        &self,
        id: i64,
        changes: &EventPlayerChanges,
    ) -> Result<Option<EventPlayerModel>, AppError> {
        let mut store = self.store.write().await;
        Ok(store.entries.get_mut(&id).map(|entry| {
            if let Some(seed) = changes.seed {
                entry.seed = seed;
            }
            if let Some(placement) = changes.placement {
                entry.placement = placement;
            }
            entry.clone()
        }))
    }

    #[instrument(skip(self))]
    async fn remove_event_player(&self, id: i64) -> Result<Option<EventPlayerModel>, AppError> {
        Ok(self.store.write().await.entries.remove(&id))
    }

    async fn count_by_player(&self, player_id: i64) -> Result<i64, AppError> {
        let store = self.store.read().await;
        Ok(store
            .entries
            .values()
            .filter(|e| e.player_id == player_id)
            .count() as i64)
    }
}

/// PostgreSQL implementation of event roster repository
pub struct PostgresEventPlayerRepository {
    pool: PgPool,
}

impl PostgresEventPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventPlayerRepository for PostgresEventPlayerRepository {
    #[instrument(skip(self, entry))]
    async fn add_event_player(
        &self,
        entry: &NewEventPlayer,
    ) -> Result<EventPlayerModel, AppError> {
        sqlx::query_as::<_, EventPlayerModel>(
            "INSERT INTO event_players (event_id, player_id, seed, placement) \
             VALUES ($1, $2, $3, $4) RETURNING id, event_id, player_id, seed, placement",
        )
        .bind(entry.event_id)
        .bind(entry.player_id)
        .bind(entry.seed)
        .bind(entry.placement)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("Player is already in this event")
            } else {
                database_error("add event player")(e)
            }
        })
    }

    #[instrument(skip(self))]
    async fn get_event_player(&self, id: i64) -> Result<Option<EventPlayerModel>, AppError> {
        sqlx::query_as::<_, EventPlayerModel>(
            "SELECT id, event_id, player_id, seed, placement FROM event_players WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("get event player"))
    }

    #[instrument(skip(self))]
    async fn find_event_player(
        &self,
        event_id: i64,
        player_id: i64,
    ) -> Result<Option<EventPlayerModel>, AppError> {
        sqlx::query_as::<_, EventPlayerModel>(
            "SELECT id, event_id, player_id, seed, placement FROM event_players \
             WHERE event_id = $1 AND player_id = $2",
        )
        .bind(event_id)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("find event player"))
    }

    #[instrument(skip(self))]
    async fn list_by_event(&self, event_id: i64) -> Result<Vec<EventPlayerModel>, AppError> {
        sqlx::query_as::<_, EventPlayerModel>(
            "SELECT id, event_id, player_id, seed, placement FROM event_players \
             WHERE event_id = $1 ORDER BY seed ASC NULLS LAST, placement ASC NULLS LAST, id ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list event players"))
    }

    #[instrument(skip(self, changes))]
    async fn update_event_player(
        &self,
        id: i64,
        changes: &EventPlayerChanges,
    ) -> Result<Option<EventPlayerModel>, AppError> {
        sqlx::query_as::<_, EventPlayerModel>(
            "UPDATE event_players SET \
             seed = CASE WHEN $2 THEN $3 ELSE seed END, \
             placement = CASE WHEN $4 THEN $5 ELSE placement END \
             WHERE id = $1 RETURNING id, event_id, player_id, seed, placement",
        )
        .bind(id)
        .bind(changes.seed.is_some())
        .bind(changes.seed.flatten())
        .bind(changes.placement.is_some())
        .bind(changes.placement.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("update event player"))
    }

    #[instrument(skip(self))]
    async fn remove_event_player(&self, id: i64) -> Result<Option<EventPlayerModel>, AppError> {
        sqlx::query_as::<_, EventPlayerModel>(
            "DELETE FROM event_players WHERE id = $1 \
             RETURNING id, event_id, player_id, seed, placement",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("remove event player"))
    }

    #[instrument(skip(self))]
    async fn count_by_player(&self, player_id: i64) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event_players WHERE player_id = $1")
            .bind(player_id)
            .fetch_one(&self.pool)
            .await
            .map_err(database_error("count event players"))
    }
}
