// Public API - what other modules can use
pub use handlers::{
    create_player, get_player, get_player_by_gamertag, list_event_roster, list_players,
    update_player,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
