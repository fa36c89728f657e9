pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod services;
pub mod state;

pub use config::{ApiConfig, NearbySettings};
pub use router::create_router;
pub use state::AppState;
