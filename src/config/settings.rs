//! Application settings configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ConfigError, Result};

/// The public Trello API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com";

/// Lists whose name matches this pattern are shown in the report.
pub const DEFAULT_LIST_PATTERN: &str = "(To Do|Doing)";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application-wide settings.
///
/// Read from `config.toml` in the trello-doing config directory. Every field
/// is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The Trello API base URL.
    pub base_url: String,
    /// Regex matched against list names.
    pub list_pattern: String,
    /// Per-request timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            list_pattern: DEFAULT_LIST_PATTERN.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// location is tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_or_default(default_path().as_deref()),
        }
    }

    /// Load settings from `path` if that file exists, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from(path),
            _ => {
                debug!("No settings file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Replace file values with the ones given on the command line.
    pub fn apply_overrides(
        &mut self,
        base_url: Option<String>,
        list_pattern: Option<String>,
        timeout_secs: Option<u64>,
    ) {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(list_pattern) = list_pattern {
            self.list_pattern = list_pattern;
        }
        if let Some(timeout_secs) = timeout_secs {
            self.timeout_secs = timeout_secs;
        }
    }

    /// The request timeout, if enabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// The default settings file location, e.g. `~/.config/trello-doing/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("trello-doing").join("config.toml"))
}
