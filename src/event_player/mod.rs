// Public API - what other modules can use
pub use handlers::{add_player_to_event, remove_player_from_event, update_event_player};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
