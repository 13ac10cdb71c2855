use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::{
    service::EventPlayerService,
    types::{
        AddEventPlayerRequest, EventPlayerResponse, RemoveEventPlayerResponse,
        UpdateEventPlayerRequest,
    },
};
use crate::shared::{AppError, AppState};

/// POST /api/eventPlayer
#[instrument(name = "add_player_to_event", skip(state, request))]
pub async fn add_player_to_event(
    State(state): State<AppState>,
    Json(request): Json<AddEventPlayerRequest>,
) -> Result<(StatusCode, Json<EventPlayerResponse>), AppError> {
    info!(event_id = ?request.event_id, player_id = ?request.player_id, "Adding player to event");
    let entry = EventPlayerService::from_state(&state)
        .add_player_to_event(request)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/eventPlayer/:id
#[instrument(name = "update_event_player", skip(state, request))]
pub async fn update_event_player(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEventPlayerRequest>,
) -> Result<Json<EventPlayerResponse>, AppError> {
    Ok(Json(
        EventPlayerService::from_state(&state)
            .update_event_player(id, request)
            .await?,
    ))
}

/// DELETE /api/eventPlayer/:id
#[instrument(name = "remove_player_from_event", skip(state))]
pub async fn remove_player_from_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RemoveEventPlayerResponse>, AppError> {
    info!(event_player_id = id, "Removing player from event");
    Ok(Json(
        EventPlayerService::from_state(&state)
            .remove_player_from_event(id)
            .await?,
    ))
}
