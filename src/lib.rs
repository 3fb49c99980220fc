// Public API for integration tests and potential library usage

pub mod api;
pub mod assets;
pub mod clock;
pub mod config;
pub mod error;
pub mod protocol;
pub mod render;
pub mod state;
pub mod types;
pub mod watcher;
