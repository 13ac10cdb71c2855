use smx_tdb::{build_router, db, AppConfig, AppState, AuthService, TokenConfig};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smx_tdb=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    info!(port = config.port, "Starting tournament records server");

    let token_config = TokenConfig::new(config.jwt_key.clone(), config.token_expiration_hours);

    // Easy to switch between implementations:
    let app_state = match &config.database_url {
        Some(database_url) => {
            let pool = db::connect(database_url).await?;
            db::postgres_state(pool, token_config)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory repositories");
            AppState::in_memory(token_config)
        }
    };

    if let Some((email, password)) = &config.bootstrap_admin {
        AuthService::from_state(&app_state)
            .bootstrap_admin(email, password)
            .await?;
    }

    let app = build_router(app_state, config.ui_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}
