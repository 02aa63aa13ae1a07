//! Error types for smart-helper-core

use thiserror::Error;

use crate::auth::AuthError;

/// Main error type for the smart-helper-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Sign-up, login or role check rejected
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The session task has already shut down
    #[error("session closed: {0}")]
    SessionClosed(String),
}

/// Result type alias for smart-helper-core
pub type Result<T> = std::result::Result<T, Error>;
