// Public API - what other modules can use
pub use handlers::{
    create_chart, create_song, delete_song, get_song, list_charts, list_songs, update_song,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
