//! Configuration management for trello-doing.
//!
//! This module handles the Trello credentials taken from the environment and
//! the optional settings file.

mod credentials;
mod settings;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub use credentials::{Credentials, KEY_MIN_LEN, TOKEN_MIN_LEN};
pub use settings::{Settings, DEFAULT_BASE_URL, DEFAULT_LIST_PATTERN};

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The uppercased field name, matching its environment variable.
    pub field: String,
    /// What was wrong with the value.
    pub reason: String,
}

impl FieldError {
    /// Create a field error; `field` is uppercased.
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_uppercase(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.field, self.reason)
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more fields failed validation. Every failing field is listed.
    #[error("invalid configuration: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// The settings file exists but could not be read.
    #[error("failed to read settings file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`Settings`].
    #[error("failed to parse settings file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The list name pattern is not a valid regular expression.
    #[error("invalid list pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
