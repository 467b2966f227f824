//! Error types for the secret guard

use thiserror::Error;

/// Result type for secret guard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the secret guard subsystem
#[derive(Error, Debug)]
pub enum Error {
    #[error("Built-in denylist missing or unreadable: {0}")]
    DefaultsUnavailable(String),

    #[error("Merged pattern cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Invalid tool invocation: {0}")]
    InvalidInvocation(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
