use axum::{
    extract::Request,
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::auth::{self, require_admin, require_auth};
use crate::shared::AppState;
use crate::{event, event_player, matches, player, song};

/// Routes anyone may call
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/user/login", post(auth::login))
        .route("/event", get(event::list_events))
        .route("/event/:id", get(event::get_event))
        .route("/player", get(player::list_players))
        .route("/player/:id", get(player::get_player))
        .route("/player/:id/record", get(matches::get_player_record))
        .route("/player/gamertag/:gamertag", get(player::get_player_by_gamertag))
        .route("/player/event/:event_id", get(player::list_event_roster))
        .route("/song", get(song::list_songs))
        .route("/song/:id", get(song::get_song))
        .route("/song/:id/charts", get(song::list_charts))
        .route("/match/event/:event_id", get(matches::list_matches_by_event))
        .route("/match/:id", get(matches::get_match))
}

/// Routes for any signed-in user
fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/user/updatePassword", post(auth::update_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

/// Routes that change tournament data; admin tokens only
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/user/signUp", post(auth::sign_up))
        .route("/event", post(event::create_event))
        .route(
            "/event/:id",
            put(event::update_event).delete(event::delete_event),
        )
        .route("/player", post(player::create_player))
        .route("/player/:id", put(player::update_player))
        .route("/eventPlayer", post(event_player::add_player_to_event))
        .route(
            "/eventPlayer/:id",
            put(event_player::update_event_player).delete(event_player::remove_player_from_event),
        )
        .route("/song", post(song::create_song))
        .route("/song/:id", put(song::update_song).delete(song::delete_song))
        .route("/song/:id/charts", post(song::create_chart))
        .route("/match", post(matches::create_match))
        .route(
            "/match/:id",
            put(matches::update_match).delete(matches::delete_match),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}

/// Builds the full application: `/api` routes, CORS, request tracing, and
/// the admin UI as fallback when `ui_dir` is given.
pub fn build_router(state: AppState, ui_dir: Option<&Path>) -> Router {
    let api = public_routes()
        .merge(user_routes(&state))
        .merge(admin_routes(&state));

    let mut app = Router::new().nest("/api", api);

    if let Some(dir) = ui_dir {
        info!(ui_dir = %dir.display(), "Serving admin UI");
        let index = ServeFile::new(dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(dir).not_found_service(index));
    }

    app.layer(cors_layer())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = Uuid::new_v4();
                info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}
