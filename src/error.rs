//! Centralized error types for trello-doing.
//!
//! This module provides the application-level error type, the text shown to
//! users on stderr, and the mapping from errors to process exit codes.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Printed after the list of invalid environment variables.
const CREDENTIALS_HINT: &str =
    "Please set your Trello API KEY and TOKEN values as environment variables.";

/// Exit code for failures before any request is made.
pub const EXIT_SETUP: u8 = 1;

/// Exit code for failures while building the report.
pub const EXIT_RUNTIME: u8 = 2;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Writing the report failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// The process exit code for this error.
    ///
    /// Configuration problems are detected before any network call and exit
    /// with [`EXIT_SETUP`]; everything else exits with [`EXIT_RUNTIME`].
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => EXIT_SETUP,
            AppError::Api(_) | AppError::Io(_) => EXIT_RUNTIME,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Format an error for display on stderr.
///
/// Validation errors become one `Invalid environment variable <NAME>` line per
/// failing field plus a hint. Anything else is shown as its own message.
pub fn format_error(err: &AppError) -> String {
    match err {
        AppError::Config(ConfigError::Validation(fields)) => {
            let mut message = String::new();
            for field in fields {
                message.push_str(&format!("Invalid environment variable {}\n", field.field));
            }
            message.push_str(CREDENTIALS_HINT);
            message.push('\n');
            message
        }
        other => other.to_string(),
    }
}
