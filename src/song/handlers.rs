use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::SongService,
    types::{ChartRequest, ChartResponse, SongRequest, SongResponse},
};
use crate::shared::{AppError, AppState, MessageResponse};

fn service(state: &AppState) -> SongService {
    SongService::new(Arc::clone(&state.song_repository))
}

/// GET /api/song
#[instrument(name = "list_songs", skip(state))]
pub async fn list_songs(
    State(state): State<AppState>,
) -> Result<Json<Vec<SongResponse>>, AppError> {
    info!("Fetching all songs");
    Ok(Json(service(&state).list_songs().await?))
}

/// GET /api/song/:id
#[instrument(name = "get_song", skip(state))]
pub async fn get_song(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
) -> Result<Json<SongResponse>, AppError> {
    Ok(Json(service(&state).get_song(song_id).await?))
}

/// POST /api/song
#[instrument(name = "create_song", skip(state, request))]
pub async fn create_song(
    State(state): State<AppState>,
    Json(request): Json<SongRequest>,
) -> Result<(StatusCode, Json<SongResponse>), AppError> {
    info!(title = ?request.title, "Creating new song");
    let song = service(&state).create_song(request).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// PUT /api/song/:id
#[instrument(name = "update_song", skip(state, request))]
pub async fn update_song(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
    Json(request): Json<SongRequest>,
) -> Result<Json<SongResponse>, AppError> {
    info!(song_id, "Updating song");
    Ok(Json(service(&state).update_song(song_id, request).await?))
}

/// DELETE /api/song/:id
#[instrument(name = "delete_song", skip(state))]
pub async fn delete_song(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    info!(song_id, "Deleting song");
    service(&state).delete_song(song_id).await?;
    Ok(Json(MessageResponse::new("Song deleted successfully")))
}

/// GET /api/song/:id/charts
#[instrument(name = "list_charts", skip(state))]
pub async fn list_charts(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
) -> Result<Json<Vec<ChartResponse>>, AppError> {
    info!(song_id, "Fetching charts for song");
    Ok(Json(service(&state).list_charts(song_id).await?))
}

/// POST /api/song/:id/charts
#[instrument(name = "create_chart", skip(state, request))]
pub async fn create_chart(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
    Json(request): Json<ChartRequest>,
) -> Result<(StatusCode, Json<ChartResponse>), AppError> {
    let chart = service(&state).create_chart(song_id, request).await?;
    Ok((StatusCode::CREATED, Json(chart)))
}
