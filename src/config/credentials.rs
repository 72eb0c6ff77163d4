//! Trello API credentials.

use std::fmt;

use reqwest::Url;

use super::{ConfigError, FieldError, Result};

/// Minimum accepted length of the Trello API key.
pub const KEY_MIN_LEN: usize = 20;

/// Minimum accepted length of the Trello API token.
pub const TOKEN_MIN_LEN: usize = 50;

/// Environment variable holding the API key.
const KEY_VAR: &str = "KEY";

/// Environment variable holding the API token.
const TOKEN_VAR: &str = "TOKEN";

/// Validated credentials for the Trello API.
///
/// Can only be obtained through [`Credentials::new`], so holding one means the
/// base URL, key and token all passed validation.
#[derive(Clone)]
pub struct Credentials {
    base_url: Url,
    key: String,
    token: String,
}

impl Credentials {
    /// Validate and build credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` listing every field that failed,
    /// not just the first one.
    pub fn new(base_url: &str, key: &str, token: &str) -> Result<Self> {
        let mut errors = Vec::new();

        let url = match parse_http_url(base_url) {
            Ok(url) => Some(url),
            Err(reason) => {
                errors.push(FieldError::new("baseurl", reason));
                None
            }
        };

        if key.chars().count() < KEY_MIN_LEN {
            errors.push(FieldError::new(
                "key",
                format!("must be at least {} characters", KEY_MIN_LEN),
            ));
        }

        if token.chars().count() < TOKEN_MIN_LEN {
            errors.push(FieldError::new(
                "token",
                format!("must be at least {} characters", TOKEN_MIN_LEN),
            ));
        }

        match url {
            Some(base_url) if errors.is_empty() => Ok(Self {
                base_url,
                key: key.to_string(),
                token: token.to_string(),
            }),
            _ => Err(ConfigError::Validation(errors)),
        }
    }

    /// Build credentials from the `KEY` and `TOKEN` environment variables.
    ///
    /// An unset variable is validated as an empty string.
    pub fn from_env(base_url: &str) -> Result<Self> {
        let key = std::env::var(KEY_VAR).unwrap_or_default();
        let token = std::env::var(TOKEN_VAR).unwrap_or_default();
        Self::new(base_url, &key, &token)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The API key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The API token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url.as_str())
            .field("key", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Parse an absolute http(s) URL with a host.
fn parse_http_url(raw: &str) -> std::result::Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("not a valid URL: {}", e))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }

    Ok(url)
}
