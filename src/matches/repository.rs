use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{
    models::{stat_model, MatchModel, MatchPlayerStatModel, NewMatch, PlayerScoreModel},
    scoring::PlayerId,
};
use crate::shared::{database_error, AppError};

/// Trait for match repository operations.
///
/// `create_match` and `replace_match` write the match row together with all
/// of its participants, scores and stats; implementations must make that
/// write atomic.
#[async_trait]
pub trait MatchRepository {
    async fn create_match(&self, new_match: &NewMatch) -> Result<MatchModel, AppError>;

    /// Updates the match row and replaces every child row. `None` if the match does not exist.
    async fn replace_match(
        &self,
        match_id: i64,
        new_match: &NewMatch,
    ) -> Result<Option<MatchModel>, AppError>;

    async fn get_match(&self, match_id: i64) -> Result<Option<MatchModel>, AppError>;
    async fn list_matches_by_event(&self, event_id: i64) -> Result<Vec<MatchModel>, AppError>;
    async fn list_matches_by_player(&self, player_id: PlayerId)
        -> Result<Vec<MatchModel>, AppError>;
    async fn get_participant_ids(&self, match_id: i64) -> Result<Vec<PlayerId>, AppError>;
    async fn get_scores(&self, match_id: i64) -> Result<Vec<PlayerScoreModel>, AppError>;
    async fn get_stats(&self, match_id: i64) -> Result<Vec<MatchPlayerStatModel>, AppError>;
    async fn get_stats_by_player(
        &self,
        player_id: PlayerId,
    ) -> Result<Vec<MatchPlayerStatModel>, AppError>;
    async fn delete_match(&self, match_id: i64) -> Result<bool, AppError>;
}

#[derive(Default)]
struct MatchStore {
    next_id: i64,
    matches: BTreeMap<i64, MatchModel>,
    participants: BTreeMap<i64, Vec<PlayerId>>,
    scores: BTreeMap<i64, Vec<PlayerScoreModel>>,
    stats: BTreeMap<i64, Vec<MatchPlayerStatModel>>,
}

impl MatchStore {
    fn write_children(&mut self, match_id: i64, new_match: &NewMatch) {
        self.participants
            .insert(match_id, new_match.participants.clone());
        self.scores.insert(
            match_id,
            new_match
                .scores
                .iter()
                .map(|score| score.to_model(match_id))
                .collect(),
        );
        self.stats.insert(
            match_id,
            new_match
                .stats
                .iter()
                .map(|(player_id, record)| stat_model(match_id, *player_id, record))
                .collect(),
        );
    }
}

fn newest_first(mut matches: Vec<MatchModel>) -> Vec<MatchModel> {
    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    matches
}

/// In-memory implementation of MatchRepository for development and testing.
/// A single lock guards the match and its children so writes are atomic.
#[derive(Default)]
pub struct InMemoryMatchRepository {
    store: RwLock<MatchStore>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    #[instrument(skip(self, new_match))]
    async fn create_match(&self, new_match: &NewMatch) -> Result<MatchModel, AppError> {
        let mut store = self.store.write().await;
        store.next_id += 1;

        let model = MatchModel {
            id: store.next_id,
            event_id: new_match.event_id,
            round: new_match.round.clone(),
            winner_id: new_match.winner_id,
            created_by: new_match.created_by,
            created_at: Utc::now(),
        };
        store.matches.insert(model.id, model.clone());
        store.write_children(model.id, new_match);

        debug!(match_id = model.id, "Match created in memory");
        Ok(model)
    }

    #[instrument(skip(self, new_match))]
    async fn replace_match(
        &self,
        match_id: i64,
        new_match: &NewMatch,
    ) -> Result<Option<MatchModel>, AppError> {
        let mut store = self.store.write().await;

        let Some(existing) = store.matches.get_mut(&match_id) else {
            debug!(match_id, "Match not found for replacement in memory");
            return Ok(None);
        };
        existing.event_id = new_match.event_id;
        existing.round = new_match.round.clone();
        existing.winner_id = new_match.winner_id;
        let updated = existing.clone();

        store.write_children(match_id, new_match);

        debug!(match_id, "Match replaced in memory");
        Ok(Some(updated))
    }

    async fn get_match(&self, match_id: i64) -> Result<Option<MatchModel>, AppError> {
        Ok(self.store.read().await.matches.get(&match_id).cloned())
    }

    async fn list_matches_by_event(&self, event_id: i64) -> Result<Vec<MatchModel>, AppError> {
        let store = self.store.read().await;
        let matches = store
            .matches
            .values()
            .filter(|m| m.event_id == event_id)
            .cloned()
            .collect();
        Ok(newest_first(matches))
    }

    async fn list_matches_by_player(
        &self,
        player_id: PlayerId,
    ) -> Result<Vec<MatchModel>, AppError> {
        let store = self.store.read().await;
        let matches = store
            .participants
            .iter()
            .filter(|(_, players)| players.contains(&player_id))
            .filter_map(|(match_id, _)| store.matches.get(match_id).cloned())
            .collect();
        Ok(newest_first(matches))
    }

    async fn get_participant_ids(&self, match_id: i64) -> Result<Vec<PlayerId>, AppError> {
        let store = self.store.read().await;
        Ok(store.participants.get(&match_id).cloned().unwrap_or_default())
    }

    async fn get_scores(&self, match_id: i64) -> Result<Vec<PlayerScoreModel>, AppError> {
        let store = self.store.read().await;
        Ok(store.scores.get(&match_id).cloned().unwrap_or_default())
    }

    async fn get_stats(&self, match_id: i64) -> Result<Vec<MatchPlayerStatModel>, AppError> {
        let store = self.store.read().await;
        Ok(store.stats.get(&match_id).cloned().unwrap_or_default())
    }

    async fn get_stats_by_player(
        &self,
        player_id: PlayerId,
    ) -> Result<Vec<MatchPlayerStatModel>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .stats
            .values()
            .flatten()
            .filter(|stat| stat.player_id == player_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_match(&self, match_id: i64) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        let removed = store.matches.remove(&match_id).is_some();
        store.participants.remove(&match_id);
        store.scores.remove(&match_id);
        store.stats.remove(&match_id);
        debug!(match_id, removed, "Match deleted from memory");
        Ok(removed)
    }
}

/// PostgreSQL implementation of match repository
pub struct PostgresMatchRepository {
    pool: PgPool,
}

impl PostgresMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_children(
        tx: &mut Transaction<'_, Postgres>,
        match_id: i64,
        new_match: &NewMatch,
    ) -> Result<(), AppError> {
        for player_id in &new_match.participants {
            sqlx::query("INSERT INTO match_players (match_id, player_id) VALUES ($1, $2)")
                .bind(match_id)
                .bind(player_id)
                .execute(&mut **tx)
                .await
                .map_err(database_error("insert match participant"))?;
        }

        for score in &new_match.scores {
            sqlx::query(
                "INSERT INTO match_player_scores \
                 (match_id, song_id, chart_id, song_order, player_id, score, win) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(match_id)
            .bind(score.song_id)
            .bind(score.chart_id)
            .bind(score.song_order)
            .bind(score.player_id)
            .bind(score.score)
            .bind(score.win)
            .execute(&mut **tx)
            .await
            .map_err(database_error("insert match score"))?;
        }

        for (player_id, record) in &new_match.stats {
            let stat = stat_model(match_id, *player_id, record);
            sqlx::query(
                "INSERT INTO match_player_stats (match_id, player_id, wins, losses, draws) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(stat.match_id)
            .bind(stat.player_id)
            .bind(stat.wins)
            .bind(stat.losses)
            .bind(stat.draws)
            .execute(&mut **tx)
            .await
            .map_err(database_error("insert match stat"))?;
        }

        Ok(())
    }
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    #[instrument(skip(self, new_match), fields(event_id = new_match.event_id))]
    async fn create_match(&self, new_match: &NewMatch) -> Result<MatchModel, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("begin match transaction"))?;

        let model = sqlx::query_as::<_, MatchModel>(
            "INSERT INTO matches (event_id, round, winner_id, created_by) VALUES ($1, $2, $3, $4) \
             RETURNING id, event_id, round, winner_id, created_by, created_at",
        )
        .bind(new_match.event_id)
        .bind(&new_match.round)
        .bind(new_match.winner_id)
        .bind(new_match.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(database_error("create match"))?;

        Self::insert_children(&mut tx, model.id, new_match).await?;

        tx.commit()
            .await
            .map_err(database_error("commit match transaction"))?;

        debug!(match_id = model.id, "Match created in database");
        Ok(model)
    }

    #[instrument(skip(self, new_match))]
    async fn replace_match(
        &self,
        match_id: i64,
        new_match: &NewMatch,
    ) -> Result<Option<MatchModel>, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("begin match transaction"))?;

        let updated = sqlx::query_as::<_, MatchModel>(
            "UPDATE matches SET event_id = $2, round = $3, winner_id = $4 WHERE id = $1 \
             RETURNING id, event_id, round, winner_id, created_by, created_at",
        )
        .bind(match_id)
        .bind(new_match.event_id)
        .bind(&new_match.round)
        .bind(new_match.winner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error("update match"))?;

        let Some(updated) = updated else {
            debug!(match_id, "Match not found for replacement in database");
            return Ok(None);
        };

        for table in ["match_players", "match_player_scores", "match_player_stats"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE match_id = $1"))
                .bind(match_id)
                .execute(&mut *tx)
                .await
                .map_err(database_error("clear match children"))?;
        }

        Self::insert_children(&mut tx, match_id, new_match).await?;

        tx.commit()
            .await
            .map_err(database_error("commit match transaction"))?;

        debug!(match_id, "Match replaced in database");
        Ok(Some(updated))
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: i64) -> Result<Option<MatchModel>, AppError> {
        sqlx::query_as::<_, MatchModel>(
            "SELECT id, event_id, round, winner_id, created_by, created_at \
             FROM matches WHERE id = $1",
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("get match"))
    }

    #[instrument(skip(self))]
    async fn list_matches_by_event(&self, event_id: i64) -> Result<Vec<MatchModel>, AppError> {
        sqlx::query_as::<_, MatchModel>(
            "SELECT id, event_id, round, winner_id, created_by, created_at FROM matches \
             WHERE event_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list matches by event"))
    }

    #[instrument(skip(self))]
    async fn list_matches_by_player(
        &self,
        player_id: PlayerId,
    ) -> Result<Vec<MatchModel>, AppError> {
        sqlx::query_as::<_, MatchModel>(
            "SELECT m.id, m.event_id, m.round, m.winner_id, m.created_by, m.created_at \
             FROM matches m JOIN match_players mp ON mp.match_id = m.id \
             WHERE mp.player_id = $1 ORDER BY m.created_at DESC, m.id DESC",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list matches by player"))
    }

    async fn get_participant_ids(&self, match_id: i64) -> Result<Vec<PlayerId>, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT player_id FROM match_players WHERE match_id = $1 ORDER BY player_id ASC",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("get match participants"))
    }

    async fn get_scores(&self, match_id: i64) -> Result<Vec<PlayerScoreModel>, AppError> {
        sqlx::query_as::<_, PlayerScoreModel>(
            "SELECT match_id, song_id, chart_id, song_order, player_id, score, win \
             FROM match_player_scores WHERE match_id = $1 \
             ORDER BY song_order ASC NULLS LAST, song_id ASC, player_id ASC",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("get match scores"))
    }

    async fn get_stats(&self, match_id: i64) -> Result<Vec<MatchPlayerStatModel>, AppError> {
        sqlx::query_as::<_, MatchPlayerStatModel>(
            "SELECT match_id, player_id, wins, losses, draws FROM match_player_stats \
             WHERE match_id = $1 ORDER BY player_id ASC",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("get match stats"))
    }

    async fn get_stats_by_player(
        &self,
        player_id: PlayerId,
    ) -> Result<Vec<MatchPlayerStatModel>, AppError> {
        sqlx::query_as::<_, MatchPlayerStatModel>(
            "SELECT match_id, player_id, wins, losses, draws FROM match_player_stats \
             WHERE player_id = $1",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("get player stats"))
    }

    #[instrument(skip(self))]
    async fn delete_match(&self, match_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(match_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete match"))?;

        debug!(match_id, rows = result.rows_affected(), "Match delete executed");
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::models::NewPlayerScore;
    use crate::matches::scoring::WinLossDraw;

    fn new_match(event_id: i64, participants: Vec<PlayerId>) -> NewMatch {
        NewMatch {
            event_id,
            round: None,
            winner_id: None,
            created_by: None,
            stats: participants
                .iter()
                .map(|id| (*id, WinLossDraw::default()))
                .collect(),
            participants,
            scores: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_and_read_back_children() {
        let repo = InMemoryMatchRepository::new();
        let mut draft = new_match(1, vec![1, 2]);
        draft.scores = vec![NewPlayerScore {
            song_id: 5,
            chart_id: None,
            song_order: 1,
            player_id: 1,
            score: Some(10),
            win: true,
        }];

        let created = repo.create_match(&draft).await.unwrap();

        assert_eq!(repo.get_participant_ids(created.id).await.unwrap(), vec![1, 2]);
        assert_eq!(repo.get_scores(created.id).await.unwrap().len(), 1);
        assert_eq!(repo.get_stats(created.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn replace_swaps_every_child_row() {
        let repo = InMemoryMatchRepository::new();
        let created = repo.create_match(&new_match(1, vec![1, 2])).await.unwrap();

        let mut replacement = new_match(2, vec![3, 4, 5]);
        replacement.winner_id = Some(4);
        let updated = repo
            .replace_match(created.id, &replacement)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.event_id, 2);
        assert_eq!(updated.winner_id, Some(4));
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(
            repo.get_participant_ids(created.id).await.unwrap(),
            vec![3, 4, 5]
        );
        assert_eq!(repo.get_stats(created.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn replace_missing_match_returns_none() {
        let repo = InMemoryMatchRepository::new();
        let result = repo.replace_match(99, &new_match(1, vec![1, 2])).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn lists_by_event_and_player_newest_first() {
        let repo = InMemoryMatchRepository::new();
        let first = repo.create_match(&new_match(1, vec![1, 2])).await.unwrap();
        let second = repo.create_match(&new_match(1, vec![2, 3])).await.unwrap();
        repo.create_match(&new_match(2, vec![1, 3])).await.unwrap();

        let by_event: Vec<i64> = repo
            .list_matches_by_event(1)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(by_event, vec![second.id, first.id]);

        let by_player = repo.list_matches_by_player(2).await.unwrap();
        assert_eq!(by_player.len(), 2);
        assert_eq!(repo.get_stats_by_player(3).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_removes_match_and_children() {
        let repo = InMemoryMatchRepository::new();
        let created = repo.create_match(&new_match(1, vec![1, 2])).await.unwrap();

        assert!(repo.delete_match(created.id).await.unwrap());
        assert!(repo.get_match(created.id).await.unwrap().is_none());
        assert!(repo.get_stats(created.id).await.unwrap().is_empty());
        assert!(!repo.delete_match(created.id).await.unwrap());
    }
}
