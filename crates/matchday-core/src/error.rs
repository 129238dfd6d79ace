//! Error types for matchday-core

use thiserror::Error;

use crate::api::ApiError;

/// Result type alias using matchday-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in matchday-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// No stored credential; the caller must sign in first
    #[error("Sign in required")]
    AuthRequired,

    /// The backend rejected the stored credential
    #[error("Session expired; sign in again")]
    SessionExpired,

    /// The backend is unreachable
    #[error("Server is unreachable")]
    Offline,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Cache database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend API error
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}
