//! Error types for taskboard
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, blocked validation)
//! - 3: Precondition unmet (no organization selected)
//! - 4: Operation failed (fetch, submit, transport)

use thiserror::Error;

/// Exit codes for the taskboard CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const PRECONDITION_UNMET: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskboard operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("{field} cannot be empty")]
    ValidationBlocked { field: &'static str },

    // Preconditions (exit code 3)
    #[error("No organization selected")]
    NoOrganization,

    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    // Operation failures (exit code 4)
    #[error("Failed to fetch from backend: {0}")]
    FetchFailed(String),

    #[error("Failed to submit comment: {0}")]
    SubmitFailed(String),

    #[error("Backend rejected the request: {0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::TaskNotFound(_)
            | Error::ValidationBlocked { .. } => exit_codes::USER_ERROR,

            // Preconditions
            Error::NoOrganization | Error::OrganizationNotFound(_) => {
                exit_codes::PRECONDITION_UNMET
            }

            // Operation failures
            Error::FetchFailed(_)
            | Error::SubmitFailed(_)
            | Error::Backend(_)
            | Error::Http(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for taskboard operations
pub type Result<T> = std::result::Result<T, Error>;
