//! Error types for faux-update

use thiserror::Error;

/// Errors that can occur while configuring or driving a prank session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session duration: {0} ms (must be positive)")]
    InvalidDuration(i64),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid recap: {0}")]
    InvalidRecap(String),

    #[error("Invalid screen geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
