//! Error types
//!
//! These cover startup and serving failures only. Dependency failures seen
//! while probing are never errors; they become `Unhealthy` report entries.

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// A probe with the same name is already registered
    #[error("Health probe '{0}' is already registered")]
    DuplicateProbe(String),

    /// Database client setup error
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(Box<sqlx::Error>),

    /// Redis client setup error
    #[cfg(feature = "cache")]
    #[error("Redis error: {0}")]
    Redis(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(Box::new(err))
    }
}

#[cfg(feature = "cache")]
impl From<deadpool_redis::CreatePoolError> for Error {
    fn from(err: deadpool_redis::CreatePoolError) -> Self {
        Error::Redis(err.to_string())
    }
}
