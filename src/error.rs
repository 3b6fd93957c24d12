//! Error types for gator.

use thiserror::Error;

/// Common error type for gator.
#[derive(Error, Debug)]
pub enum GatorError {
    /// Configuration error (bad interval string, unreadable config file).
    #[error("configuration error: {0}")]
    Config(String),

    /// Feed could not be retrieved or decoded into a channel.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Feed was retrieved but its channel is missing required fields.
    #[error("malformed feed: {0}")]
    Format(String),

    /// No current user is set in the configuration.
    #[error("not logged in")]
    NotLoggedIn,

    /// The named user does not exist in storage.
    #[error("user {0} not found")]
    UserNotFound(String),

    /// Command name is not present in the registry.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Database error.
    ///
    /// This is a generic database error that wraps errors from sqlx.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for GatorError {
    fn from(e: sqlx::Error) -> Self {
        GatorError::Database(e.to_string())
    }
}

/// Result type alias for gator operations.
pub type Result<T> = std::result::Result<T, GatorError>;
