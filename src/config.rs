use std::env;
use std::path::PathBuf;
use tracing::warn;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TOKEN_EXPIRATION_HOURS: i64 = 192;
const DEV_JWT_KEY: &str = "smx-tdb-dev-secret-change-me";

/// Runtime settings read from the environment (and a `.env` file when present)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Without one the server runs on in-memory repositories
    pub database_url: Option<String>,
    pub jwt_key: String,
    pub token_expiration_hours: i64,
    /// Prebuilt admin UI served for non-API paths
    pub ui_dir: Option<PathBuf>,
    pub bootstrap_admin: Option<(String, String)>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_key = non_empty("SMX_TDB_JWT_KEY").unwrap_or_else(|| {
            warn!("SMX_TDB_JWT_KEY not set, using development secret");
            DEV_JWT_KEY.to_string()
        });

        let bootstrap_admin = match (non_empty("ADMIN_EMAIL"), non_empty("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        };

        Self {
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            database_url: non_empty("DATABASE_URL"),
            jwt_key,
            token_expiration_hours: non_empty("TOKEN_EXPIRATION_HOURS")
                .and_then(|h| h.parse().ok())
                .filter(|h: &i64| *h > 0)
                .unwrap_or(DEFAULT_TOKEN_EXPIRATION_HOURS),
            ui_dir: non_empty("UI_DIR").map(PathBuf::from),
            bootstrap_admin,
        }
    }
}
