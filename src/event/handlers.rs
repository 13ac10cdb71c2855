use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::EventService,
    types::{EventRequest, EventResponse},
};
use crate::shared::{AppError, AppState, MessageResponse};

fn service(state: &AppState) -> EventService {
    EventService::new(Arc::clone(&state.event_repository))
}

/// GET /api/event
#[instrument(name = "list_events", skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    info!("Fetching all events");
    Ok(Json(service(&state).list_events().await?))
}

/// GET /api/event/:id
#[instrument(name = "get_event", skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventResponse>, AppError> {
    Ok(Json(service(&state).get_event(event_id).await?))
}

/// POST /api/event
#[instrument(name = "create_event", skip(state, request))]
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    info!(name = ?request.name, "Creating new event");
    let event = service(&state).create_event(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/event/:id
#[instrument(name = "update_event", skip(state, request))]
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(request): Json<EventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    info!(event_id, "Updating event");
    Ok(Json(service(&state).update_event(event_id, request).await?))
}

/// DELETE /api/event/:id
#[instrument(name = "delete_event", skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    info!(event_id, "Deleting event");
    service(&state).delete_event(event_id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}
