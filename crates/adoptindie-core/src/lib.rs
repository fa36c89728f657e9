//! AdoptIndie Core - Domain models, configuration, and spatial helpers
//!
//! This crate contains the sighting record model, coordinate validation and
//! the spherical distance logic shared by the store adapters and the API.

pub mod config;
pub mod error;
pub mod models;
pub mod spatial;

pub use error::{AdoptError, Result};
