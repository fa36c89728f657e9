//! Error types for AdoptIndie

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdoptError {
    // Client input errors
    #[error("Invalid coordinates: {reason}")]
    InvalidCoordinates { reason: String },

    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("No file uploaded")]
    MissingFile,

    // Upstream errors
    #[error("Record store error: {0}")]
    RecordStore(String),

    #[error("Blob store error: {0}")]
    BlobStore(String),

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AdoptError {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input rather than an upstream service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AdoptError::InvalidCoordinates { .. }
                | AdoptError::InvalidParameter { .. }
                | AdoptError::MissingFile
        )
    }
}

pub type Result<T> = std::result::Result<T, AdoptError>;
