use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument};

use super::{
    service::MatchService,
    types::{MatchView, MatchWriteRequest, PlayerRecordResponse},
};
use crate::auth::RequestContext;
use crate::shared::{AppError, AppState, MessageResponse};

/// GET /api/match/event/:event_id
#[instrument(name = "list_matches_by_event", skip(state))]
pub async fn list_matches_by_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<MatchView>>, AppError> {
    info!(event_id, "Fetching matches for event");
    let matches = MatchService::from_state(&state)
        .list_matches_by_event(event_id)
        .await?;
    Ok(Json(matches))
}

/// GET /api/match/:id
#[instrument(name = "get_match", skip(state))]
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<i64>,
) -> Result<Json<MatchView>, AppError> {
    info!(match_id, "Fetching match");
    let view = MatchService::from_state(&state).get_match(match_id).await?;
    Ok(Json(view))
}

/// POST /api/match
///
/// Validates the scoring report, stores the match and its child rows, and
/// returns the assembled view with 201.
#[instrument(
    name = "create_match",
    skip(state, context, request),
    fields(user_id = context.user_id)
)]
pub async fn create_match(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Json(request): Json<MatchWriteRequest>,
) -> Result<(StatusCode, Json<MatchView>), AppError> {
    info!(event_id = request.event_id, "Creating new match");
    let view = MatchService::from_state(&state)
        .create_match(request, Some(context.user_id))
        .await?;

    info!(match_id = view.match_id, "Match created successfully");
    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /api/match/:id
#[instrument(name = "update_match", skip(state, request))]
pub async fn update_match(
    State(state): State<AppState>,
    Path(match_id): Path<i64>,
    Json(request): Json<MatchWriteRequest>,
) -> Result<Json<MatchView>, AppError> {
    info!(match_id, "Updating match");
    let view = MatchService::from_state(&state)
        .update_match(match_id, request)
        .await?;
    Ok(Json(view))
}

/// DELETE /api/match/:id
#[instrument(name = "delete_match", skip(state))]
pub async fn delete_match(
    State(state): State<AppState>,
    Path(match_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    info!(match_id, "Deleting match");
    MatchService::from_state(&state)
        .delete_match(match_id)
        .await?;
    Ok(Json(MessageResponse::new("Match deleted successfully")))
}

/// GET /api/player/:id/record
#[instrument(name = "get_player_record", skip(state))]
pub async fn get_player_record(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
) -> Result<Json<PlayerRecordResponse>, AppError> {
    let record = MatchService::from_state(&state)
        .player_record(player_id)
        .await?;
    Ok(Json(record))
}
