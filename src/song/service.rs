use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{NewChart, NewSong},
    repository::SongRepository,
    types::{ChartRequest, ChartResponse, SongRequest, SongResponse},
};
use crate::shared::AppError;

fn song_not_found() -> AppError {
    AppError::NotFound("Song not found".to_string())
}

/// Service for songs and their charts
pub struct SongService {
    repository: Arc<dyn SongRepository + Send + Sync>,
}

impl SongService {
    pub fn new(repository: Arc<dyn SongRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn list_songs(&self) -> Result<Vec<SongResponse>, AppError> {
        let songs = self.repository.list_songs().await?;
        Ok(songs.into_iter().map(SongResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_song(&self, song_id: i64) -> Result<SongResponse, AppError> {
        self.repository
            .get_song(song_id)
            .await?
            .map(SongResponse::from)
            .ok_or_else(song_not_found)
    }

    #[instrument(skip(self, request))]
    pub async fn create_song(&self, request: SongRequest) -> Result<SongResponse, AppError> {
        let new_song = NewSong::try_from(request)?;
        let song = self.repository.create_song(&new_song).await?;

        info!(song_id = song.id, title = %song.title, "Song created");
        Ok(song.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update_song(
        &self,
        song_id: i64,
        request: SongRequest,
    ) -> Result<SongResponse, AppError> {
        let new_song = NewSong::try_from(request)?;
        self.repository
            .update_song(song_id, &new_song)
            .await?
            .map(SongResponse::from)
            .ok_or_else(song_not_found)
    }

    #[instrument(skip(self))]
    pub async fn delete_song(&self, song_id: i64) -> Result<(), AppError> {
        if !self.repository.delete_song(song_id).await? {
            return Err(song_not_found());
        }
        info!(song_id, "Song deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_charts(&self, song_id: i64) -> Result<Vec<ChartResponse>, AppError> {
        let charts = self.repository.list_charts_by_song(song_id).await?;
        Ok(charts.into_iter().map(ChartResponse::from).collect())
    }

    #[instrument(skip(self, request))]
    pub async fn create_chart(
        &self,
        song_id: i64,
        request: ChartRequest,
    ) -> Result<ChartResponse, AppError> {
        let new_chart = NewChart::try_from(request)?;
        if self.repository.get_song(song_id).await?.is_none() {
            return Err(song_not_found());
        }

        let chart = self.repository.create_chart(song_id, &new_chart).await?;
        info!(song_id, chart_id = chart.id, "Chart created");
        Ok(chart.into())
    }
}
