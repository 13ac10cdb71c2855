use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument};

use super::{
    service::PlayerService,
    types::{CreatePlayerRequest, PlayerResponse, UpdatePlayerRequest},
};
use crate::auth::RequestContext;
use crate::event_player::types::RosterEntry;
use crate::shared::{AppError, AppState};

/// GET /api/player
#[instrument(name = "list_players", skip(state))]
pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerResponse>>, AppError> {
    info!("Fetching all players");
    Ok(Json(PlayerService::from_state(&state).list_players().await?))
}

/// GET /api/player/:id
#[instrument(name = "get_player", skip(state))]
pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
) -> Result<Json<PlayerResponse>, AppError> {
    Ok(Json(
        PlayerService::from_state(&state)
            .get_player(player_id)
            .await?,
    ))
}

/// GET /api/player/gamertag/:gamertag
#[instrument(name = "get_player_by_gamertag", skip(state))]
pub async fn get_player_by_gamertag(
    State(state): State<AppState>,
    Path(gamertag): Path<String>,
) -> Result<Json<PlayerResponse>, AppError> {
    info!(gamertag = %gamertag, "Fetching player by gamertag");
    Ok(Json(
        PlayerService::from_state(&state)
            .get_player_by_gamertag(&gamertag)
            .await?,
    ))
}

/// GET /api/player/event/:event_id
#[instrument(name = "list_event_roster", skip(state))]
pub async fn list_event_roster(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<RosterEntry>>, AppError> {
    info!(event_id, "Fetching players for event");
    Ok(Json(
        PlayerService::from_state(&state)
            .list_event_roster(event_id)
            .await?,
    ))
}

/// POST /api/player
#[instrument(
    name = "create_player",
    skip(state, context, request),
    fields(user_id = context.user_id)
)]
pub async fn create_player(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Json(request): Json<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<PlayerResponse>), AppError> {
    info!(gamertag = ?request.gamertag, "Creating new player");
    let player = PlayerService::from_state(&state)
        .create_player(request, Some(context.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// PUT /api/player/:id
#[instrument(name = "update_player", skip(state, request))]
pub async fn update_player(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
    Json(request): Json<UpdatePlayerRequest>,
) -> Result<Json<PlayerResponse>, AppError> {
    info!(player_id, "Updating player");
    Ok(Json(
        PlayerService::from_state(&state)
            .update_player(player_id, request)
            .await?,
    ))
}
