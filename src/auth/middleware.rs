use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::types::RequestContext;
use crate::shared::{AppError, AppState};

fn authorization_failed() -> AppError {
    AppError::Unauthorized("Authorization failed!".to_string())
}

/// Validates the Bearer token and returns the caller it names
fn authenticate(state: &AppState, req: &Request) -> Result<RequestContext, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(|| {
            warn!(uri = %req.uri(), "Missing or malformed Authorization header");
            authorization_failed()
        })?;

    let claims = state.token_config.validate_token(token).map_err(|e| {
        warn!(error = %e, "JWT authentication failed");
        authorization_failed()
    })?;

    Ok(RequestContext::from(claims))
}

/// Any valid token. Usage:
/// `.route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth))`.
/// Handlers then extract `Extension(context): Extension<RequestContext>`.
#[instrument(skip(state, req, next))]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = authenticate(&state, &req)?;
    debug!(user_id = context.user_id, "Authenticated request");

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

/// A valid token whose claims mark the caller as an administrator
#[instrument(skip(state, req, next))]
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = authenticate(&state, &req)?;
    if !context.is_admin {
        warn!(user_id = context.user_id, "Non-admin caller on admin route");
        return Err(authorization_failed());
    }
    debug!(user_id = context.user_id, "Authenticated admin request");

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{admin_bearer, AppStateBuilder};
    use axum::{
        body::Body, http::StatusCode, middleware, routing::get, Extension, Router,
    };
    use tower::ServiceExt; // for `oneshot`

    async fn whoami(Extension(context): Extension<RequestContext>) -> String {
        context.email
    }

    fn app(state: AppState) -> Router {
        let admin = Router::new()
            .route("/admin", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
        let user = Router::new()
            .route("/me", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
        admin.merge(user).with_state(state)
    }

    fn get_with(uri: &str, auth: Option<String>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn admin_token_passes_both_layers() {
        let state = AppStateBuilder::new().build();
        let bearer = admin_bearer(&state);

        let response = app(state.clone())
            .oneshot(get_with("/admin", Some(bearer.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(state).oneshot(get_with("/me", Some(bearer))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn user_token_is_rejected_on_admin_routes() {
        let state = AppStateBuilder::new().build();
        let token = state
            .token_config
            .create_token(5, "user@example.com".to_string(), false)
            .unwrap();
        let bearer = format!("Bearer {}", token);

        let response = app(state.clone())
            .oneshot(get_with("/admin", Some(bearer.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(state).oneshot(get_with("/me", Some(bearer))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_or_garbage_token_is_unauthorized() {
        let state = AppStateBuilder::new().build();

        for auth in [None, Some("Bearer nonsense".to_string()), Some("Token x".to_string())] {
            let response = app(state.clone()).oneshot(get_with("/me", auth)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
