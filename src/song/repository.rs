use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::{ChartModel, NewChart, NewSong, SongModel};
use crate::shared::{database_error, AppError};

/// Trait for song and chart repository operations
#[async_trait]
pub trait SongRepository {
    async fn create_song(&self, song: &NewSong) -> Result<SongModel, AppError>;
    async fn get_song(&self, song_id: i64) -> Result<Option<SongModel>, AppError>;
    async fn get_songs_by_ids(&self, song_ids: &[i64]) -> Result<Vec<SongModel>, AppError>;
    /// All songs ordered by title
    async fn list_songs(&self) -> Result<Vec<SongModel>, AppError>;
    async fn update_song(&self, song_id: i64, song: &NewSong)
        -> Result<Option<SongModel>, AppError>;
    /// Removes the song together with its charts
    async fn delete_song(&self, song_id: i64) -> Result<bool, AppError>;

    async fn create_chart(&self, song_id: i64, chart: &NewChart) -> Result<ChartModel, AppError>;
    async fn get_chart(&self, chart_id: i64) -> Result<Option<ChartModel>, AppError>;
    async fn get_charts_by_ids(&self, chart_ids: &[i64]) -> Result<Vec<ChartModel>, AppError>;
    /// Charts of one song ordered by mode then difficulty
    async fn list_charts_by_song(&self, song_id: i64) -> Result<Vec<ChartModel>, AppError>;
}

#[derive(Default)]
struct SongStore {
    next_song_id: i64,
    next_chart_id: i64,
    songs: BTreeMap<i64, SongModel>,
    charts: BTreeMap<i64, ChartModel>,
}

/// In-memory implementation of SongRepository for development and testing
#[derive(Default)]
pub struct InMemorySongRepository {
    store: RwLock<SongStore>,
}

impl InMemorySongRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SongRepository for InMemorySongRepository {
    #[instrument(skip(self, song))]
    async fn create_song(&self, song: &NewSong) -> Result<SongModel, AppError> {
        let mut store = self.store.write().await;
        store.next_song_id += 1;

        let model = SongModel {
            id: store.next_song_id,
            title: song.title.clone(),
            artist: song.artist.clone(),
            created_at: Utc::now(),
        };
        store.songs.insert(model.id, model.clone());

        debug!(song_id = model.id, title = %model.title, "Song created in memory");
        Ok(model)
    }

    async fn get_song(&self, song_id: i64) -> Result<Option<SongModel>, AppError> {
        Ok(self.store.read().await.songs.get(&song_id).cloned())
    }

    async fn get_songs_by_ids(&self, song_ids: &[i64]) -> Result<Vec<SongModel>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .songs
            .values()
            .filter(|s| song_ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn list_songs(&self) -> Result<Vec<SongModel>, AppError> {
        let store = self.store.read().await;
        let mut songs: Vec<SongModel> = store.songs.values().cloned().collect();
        songs.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(songs)
    }

    #[instrument(skip(self, song))]
    async fn update_song(
        &self,
        song_id: i64,
        song: &NewSong,
    ) -> Result<Option<SongModel>, AppError> {
        let mut store = self.store.write().await;
        Ok(store.songs.get_mut(&song_id).map(|existing| {
            existing.title = song.title.clone();
            existing.artist = song.artist.clone();
            existing.clone()
        }))
    }

    #[instrument(skip(self))]
    async fn delete_song(&self, song_id: i64) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        store.charts.retain(|_, chart| chart.song_id != song_id);
        Ok(store.songs.remove(&song_id).is_some())
    }

    #[instrument(skip(self, chart))]
    async fn create_chart(&self, song_id: i64, chart: &NewChart) -> Result<ChartModel, AppError> {
        let mut store = self.store.write().await;
        if !store.songs.contains_key(&song_id) {
            return Err(AppError::NotFound("Song not found".to_string()));
        }
        store.next_chart_id += 1;

        let model = ChartModel {
            id: store.next_chart_id,
            song_id,
            mode: chart.mode.clone(),
            difficulty: chart.difficulty,
        };
        store.charts.insert(model.id, model.clone());
        Ok(model)
    }

    async fn get_chart(&self, chart_id: i64) -> Result<Option<ChartModel>, AppError> {
        Ok(self.store.read().await.charts.get(&chart_id).cloned())
    }

    async fn get_charts_by_ids(&self, chart_ids: &[i64]) -> Result<Vec<ChartModel>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .charts
            .values()
            .filter(|c| chart_ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list_charts_by_song(&self, song_id: i64) -> Result<Vec<ChartModel>, AppError> {
        let store = self.store.read().await;
        let mut charts: Vec<ChartModel> = store
            .charts
            .values()
            .filter(|c| c.song_id == song_id)
            .cloned()
            .collect();
        charts.sort_by(|a, b| a.mode.cmp(&b.mode).then(a.difficulty.cmp(&b.difficulty)));
        Ok(charts)
    }
}

/// PostgreSQL implementation of song repository
pub struct PostgresSongRepository {
    pool: PgPool,
}

impl PostgresSongRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongRepository for PostgresSongRepository {
    #[instrument(skip(self, song))]
    async fn create_song(&self, song: &NewSong) -> Result<SongModel, AppError> {
        debug!(title = %song.title, "Creating song in database");

        sqlx::query_as::<_, SongModel>(
            "INSERT INTO songs (title, artist) VALUES ($1, $2) \
             RETURNING id, title, artist, created_at",
        )
        .bind(&song.title)
        .bind(&song.artist)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("create song"))
    }

    #[instrument(skip(self))]
    async fn get_song(&self, song_id: i64) -> Result<Option<SongModel>, AppError> {
        sqlx::query_as::<_, SongModel>(
            "SELECT id, title, artist, created_at FROM songs WHERE id = $1",
        )
        .bind(song_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("get song"))
    }

    #[instrument(skip(self, song_ids), fields(count = song_ids.len()))]
    async fn get_songs_by_ids(&self, song_ids: &[i64]) -> Result<Vec<SongModel>, AppError> {
        if song_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, SongModel>(
            "SELECT id, title, artist, created_at FROM songs WHERE id = ANY($1)",
        )
        .bind(song_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("get songs by ids"))
    }

    #[instrument(skip(self))]
    async fn list_songs(&self) -> Result<Vec<SongModel>, AppError> {
        sqlx::query_as::<_, SongModel>(
            "SELECT id, title, artist, created_at FROM songs ORDER BY title ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list songs"))
    }

    #[instrument(skip(self, song))]
    async fn update_song(
        &self,
        song_id: i64,
        song: &NewSong,
    ) -> Result<Option<SongModel>, AppError> {
        sqlx::query_as::<_, SongModel>(
            "UPDATE songs SET title = $2, artist = $3 WHERE id = $1 \
             RETURNING id, title, artist, created_at",
        )
        .bind(song_id)
        .bind(&song.title)
        .bind(&song.artist)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("update song"))
    }

    #[instrument(skip(self))]
    async fn delete_song(&self, song_id: i64) -> Result<bool, AppError> {
        // charts and score rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(song_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete song"))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, chart))]
    async fn create_chart(&self, song_id: i64, chart: &NewChart) -> Result<ChartModel, AppError> {
        sqlx::query_as::<_, ChartModel>(
            "INSERT INTO charts (song_id, mode, difficulty) VALUES ($1, $2, $3) \
             RETURNING id, song_id, mode, difficulty",
        )
        .bind(song_id)
        .bind(&chart.mode)
        .bind(chart.difficulty)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("create chart"))
    }

    #[instrument(skip(self))]
    async fn get_chart(&self, chart_id: i64) -> Result<Option<ChartModel>, AppError> {
        sqlx::query_as::<_, ChartModel>(
            "SELECT id, song_id, mode, difficulty FROM charts WHERE id = $1",
        )
        .bind(chart_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("get chart"))
    }

    #[instrument(skip(self, chart_ids), fields(count = chart_ids.len()))]
    async fn get_charts_by_ids(&self, chart_ids: &[i64]) -> Result<Vec<ChartModel>, AppError> {
        if chart_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, ChartModel>(
            "SELECT id, song_id, mode, difficulty FROM charts WHERE id = ANY($1)",
        )
        .bind(chart_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("get charts by ids"))
    }

    #[instrument(skip(self))]
    async fn list_charts_by_song(&self, song_id: i64) -> Result<Vec<ChartModel>, AppError> {
        sqlx::query_as::<_, ChartModel>(
            "SELECT id, song_id, mode, difficulty FROM charts WHERE song_id = $1 \
             ORDER BY mode ASC, difficulty ASC",
        )
        .bind(song_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list charts by song"))
    }
}
