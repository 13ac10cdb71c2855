// Public API - what other modules can use
pub use handlers::{login, sign_up, update_password};
pub use middleware::{require_admin, require_auth};
pub use service::AuthService;
pub use types::{Claims, RequestContext};

// Internal modules
mod handlers;
mod middleware;
pub mod models;
mod password;
pub mod repository;
mod service;
pub mod token;
pub mod types;
