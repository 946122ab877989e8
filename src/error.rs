//! Error handling for the restaurant client

use std::fmt;
use thiserror::Error;

use crate::submission::ValidationError;

/// Unified error type for the restaurant client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Local file errors (image files picked for upload)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Collection store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A submitted form is incomplete
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The current user may not perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new forbidden error
    pub fn forbidden<T: fmt::Display>(msg: T) -> Self {
        Error::Forbidden(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// The store refused an upsert because no unique index covers its
    /// `on_conflict` columns (PostgreSQL 42P10)
    pub fn is_missing_conflict_target(&self) -> bool {
        matches!(self, Error::Database(msg) if msg.contains(NO_CONFLICT_TARGET))
    }
}

const NO_CONFLICT_TARGET: &str = "42P10";

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_target_errors_are_recognised() {
        let rejected = Error::database(
            r#"Request failed with status 400 Bad Request: {"code":"42P10","message":"there is no unique or exclusion constraint matching the ON CONFLICT specification"}"#,
        );
        assert!(rejected.is_missing_conflict_target());
        assert!(!Error::database("JWT expired").is_missing_conflict_target());
        assert!(!Error::storage("42P10").is_missing_conflict_target());
    }
}
