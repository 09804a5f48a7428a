//! Error types for taskman
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (validation, bad args, not logged in)
//! - 3: Authentication failed (credential mismatch)
//! - 4: Operation failed (storage, lock, corrupt data)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskman CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const AUTH_FAILED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskman operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("{0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Authentication (exit code 3)
    #[error("Invalid credentials")]
    InvalidCredentials,

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Stored data under '{key}' is corrupt")]
    CorruptData { key: String },

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::InvalidArgument(_)
            | Error::NotLoggedIn
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            Error::InvalidCredentials => exit_codes::AUTH_FAILED,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_)
            | Error::CorruptData { .. }
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured context for JSON output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation(message) | Error::InvalidConfig(message) => {
                Some(serde_json::json!({ "message": message }))
            }
            Error::CorruptData { key } => Some(serde_json::json!({ "key": key })),
            Error::LockFailed(path) => {
                Some(serde_json::json!({ "path": path.display().to_string() }))
            }
            _ => None,
        }
    }
}

/// Result type alias for taskman operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
