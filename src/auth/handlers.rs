use axum::{extract::State, Extension, Json};
use tracing::{info, instrument};

use super::{
    service::AuthService,
    types::{AuthResponse, CredentialsRequest, RequestContext, UpdatePasswordRequest},
};
use crate::shared::{AppError, AppState, MessageResponse};

/// POST /api/user/login
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    info!(email = ?request.email, "Login attempt");
    Ok(Json(AuthService::from_state(&state).login(request).await?))
}

/// POST /api/user/signUp
#[instrument(name = "sign_up", skip(state, context, request), fields(admin_id = context.user_id))]
pub async fn sign_up(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    info!(email = ?request.email, "Creating new user");
    Ok(Json(AuthService::from_state(&state).sign_up(request).await?))
}

/// POST /api/user/updatePassword
#[instrument(
    name = "update_password",
    skip(state, context, request),
    fields(user_id = context.user_id)
)]
pub async fn update_password(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::from_state(&state)
        .update_password(context.user_id, request)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully.")))
}
