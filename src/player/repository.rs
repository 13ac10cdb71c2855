use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::{NewPlayer, PlayerChanges, PlayerModel};
use crate::shared::{database_error, is_unique_violation, AppError};

const PLAYER_COLUMNS: &str = "id, gamertag, pronouns, user_id, created_at";

/// Trait for player repository operations
#[async_trait]
pub trait PlayerRepository {
    /// Fails with `Conflict` when the gamertag is taken
    async fn create_player(&self, player: &NewPlayer) -> Result<PlayerModel, AppError>;
    async fn get_player(&self, player_id: i64) -> Result<Option<PlayerModel>, AppError>;
    async fn get_player_by_gamertag(&self, gamertag: &str)
        -> Result<Option<PlayerModel>, AppError>;
    /// Players matching any of the ids, ordered by id; unknown ids are skipped
    async fn get_players_by_ids(&self, player_ids: &[i64]) -> Result<Vec<PlayerModel>, AppError>;
    /// All players ordered by gamertag
    async fn list_players(&self) -> Result<Vec<PlayerModel>, AppError>;
    async fn update_player(
        &self,
        player_id: i64,
        changes: &PlayerChanges,
    ) -> Result<Option<PlayerModel>, AppError>;
    async fn delete_player(&self, player_id: i64) -> Result<bool, AppError>;
}

#[derive(Default)]
struct PlayerStore {
    next_id: i64,
    players: BTreeMap<i64, PlayerModel>,
}

impl PlayerStore {
    fn gamertag_taken(&self, gamertag: &str, except: Option<i64>) -> bool {
        self.players
            .values()
            .any(|p| p.gamertag == gamertag && Some(p.id) != except)
    }
}

/// In-memory implementation of PlayerRepository for development and testing
#[derive(Default)]
pub struct InMemoryPlayerRepository {
    store: RwLock<PlayerStore>,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    #[instrument(skip(self, player))]
    async fn create_player(&self, player: &NewPlayer) -> Result<PlayerModel, AppError> {
        let mut store = self.store.write().await;
        if store.gamertag_taken(&player.gamertag, None) {
            return Err(AppError::conflict("Player with this gamertag already exists"));
        }

        store.next_id += 1;
        let model = PlayerModel {
            id: store.next_id,
            gamertag: player.gamertag.clone(),
            pronouns: player.pronouns.clone(),
            user_id: player.user_id,
            created_at: Utc::now(),
        };
        store.players.insert(model.id, model.clone());

        debug!(player_id = model.id, gamertag = %model.gamertag, "Player created in memory");
        Ok(model)
    }

    async fn get_player(&self, player_id: i64) -> Result<Option<PlayerModel>, AppError> {
        Ok(self.store.read().await.players.get(&player_id).cloned())
    }

    async fn get_player_by_gamertag(
        &self,
        gamertag: &str,
    ) -> Result<Option<PlayerModel>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .players
            .values()
            .find(|p| p.gamertag == gamertag)
            .cloned())
    }

    async fn get_players_by_ids(&self, player_ids: &[i64]) -> Result<Vec<PlayerModel>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .players
            .values()
            .filter(|p| player_ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn list_players(&self) -> Result<Vec<PlayerModel>, AppError> {
        let store = self.store.read().await;
        let mut players: Vec<PlayerModel> = store.players.values().cloned().collect();
        players.sort_by(|a, b| a.gamertag.cmp(&b.gamertag));
        Ok(players)
    }

    #[instrument(skip(self, changes))]
    async fn update_player(
        &self,
        player_id: i64,
        changes: &PlayerChanges,
    ) -> Result<Option<PlayerModel>, AppError> {
        let mut store = self.store.write().await;
        if let Some(gamertag) = &changes.gamertag {
            if store.gamertag_taken(gamertag, Some(player_id)) {
                return Err(AppError::conflict("Player with this gamertag already exists"));
            }
        }

        Ok(store.players.get_mut(&player_id).map(|player| {
            if let Some(gamertag) = &changes.gamertag {
                player.gamertag = gamertag.clone();
            }
            if let Some(pronouns) = &changes.pronouns {
                player.pronouns = pronouns.clone();
            }
            player.clone()
        }))
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, player_id: i64) -> Result<bool, AppError> {
        Ok(self.store.write().await.players.remove(&player_id).is_some())
    }
}

/// PostgreSQL implementation of player repository
pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn gamertag_conflict(operation: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if is_unique_violation(&e) {
            AppError::conflict("Player with this gamertag already exists")
        } else {
            database_error(operation)(e)
        }
    }
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    #[instrument(skip(self, player))]
    async fn create_player(&self, player: &NewPlayer) -> Result<PlayerModel, AppError> {
        debug!(gamertag = %player.gamertag, "Creating player in database");

        sqlx::query_as::<_, PlayerModel>(&format!(
            "INSERT INTO players (gamertag, pronouns, user_id) VALUES ($1, $2, $3) RETURNING {}",
            PLAYER_COLUMNS
        ))
        .bind(&player.gamertag)
        .bind(&player.pronouns)
        .bind(player.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(gamertag_conflict("create player"))
    }

    #[instrument(skip(self))]
    async fn get_player(&self, player_id: i64) -> Result<Option<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {} FROM players WHERE id = $1",
            PLAYER_COLUMNS
        ))
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("get player"))
    }

    #[instrument(skip(self))]
    async fn get_player_by_gamertag(
        &self,
        gamertag: &str,
    ) -> Result<Option<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {} FROM players WHERE gamertag = $1",
            PLAYER_COLUMNS
        ))
        .bind(gamertag)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("get player by gamertag"))
    }

    #[instrument(skip(self, player_ids), fields(count = player_ids.len()))]
    async fn get_players_by_ids(&self, player_ids: &[i64]) -> Result<Vec<PlayerModel>, AppError> {
        if player_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {} FROM players WHERE id = ANY($1) ORDER BY id",
            PLAYER_COLUMNS
        ))
        .bind(player_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("get players by ids"))
    }

    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {} FROM players ORDER BY gamertag ASC",
            PLAYER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list players"))
    }

    #[instrument(skip(self, changes))]
    async fn update_player(
        &self,
        player_id: i64,
        changes: &PlayerChanges,
    ) -> Result<Option<PlayerModel>, AppError> {
        sqlx::query_as::<_, PlayerModel>(&format!(
            "UPDATE players SET gamertag = COALESCE($2, gamertag), \
             pronouns = CASE WHEN $3 THEN $4 ELSE pronouns END \
             WHERE id = $1 RETURNING {}",
            PLAYER_COLUMNS
        ))
        .bind(player_id)
        .bind(&changes.gamertag)
        .bind(changes.pronouns.is_some())
        .bind(changes.pronouns.clone().flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(gamertag_conflict("update player"))
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, player_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(player_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete player"))?;
        Ok(result.rows_affected() > 0)
    }
}
