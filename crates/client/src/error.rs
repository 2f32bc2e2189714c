//! Error types for the Conduit client

use thiserror::Error;

/// Result type alias using the Conduit client Error
pub type Result<T> = std::result::Result<T, Error>;

/// Conduit client error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Login response carried no session token")]
    MissingToken,

    #[error("{operation} returned status {actual}, expected {expected}")]
    UnexpectedStatus {
        operation: &'static str,
        expected: u16,
        actual: u16,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage state has no origin entry to hold the session token")]
    EmptyStorageState,
}
