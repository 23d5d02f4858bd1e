//! services/api/src/error.rs
//!
//! Startup failures for the planner service. Request-time failures never reach
//! this type; handlers and middleware answer them with a status code.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The pool could not connect to Postgres.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid CORS origin '{origin}': {reason}")]
    CorsOrigin { origin: String, reason: String },

    /// Binding or serving the listener failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
