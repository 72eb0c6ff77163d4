//! Logging configuration using the tracing ecosystem.
//!
//! A one-shot report has nothing worth keeping on a normal run, so logging is
//! off unless `RUST_LOG` is set or `--verbose` is passed. When on, logs go to
//! a daily rotating file so stdout carries only the report and stderr only
//! user-facing errors.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter used by `--verbose` when RUST_LOG is not set.
const VERBOSE_LOG_FILTER: &str = "trello_doing=debug,warn";

/// Initialize the logging system.
///
/// Returns the log directory when a subscriber was installed, `None` when
/// logging stays off.
///
/// # Log Directory
///
/// - Linux: `~/.local/share/trello-doing/logs/`
/// - macOS: `~/Library/Application Support/trello-doing/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\trello-doing\logs\`
///
/// Request paths and response statuses are logged at debug level. Keys and
/// tokens never are.
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created, or
/// a global subscriber is already set.
pub fn init(verbose: bool) -> anyhow::Result<Option<PathBuf>> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let Some(directives) = log_directives(rust_log.as_deref(), verbose) else {
        return Ok(None);
    };

    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "trello-doing.log");
    let filter =
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(VERBOSE_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), filter = %directives, "Logging enabled");
    Ok(Some(log_dir))
}

/// Pick the filter directives, or `None` to leave logging off.
///
/// A non-empty RUST_LOG always wins over `--verbose`.
fn log_directives(rust_log: Option<&str>, verbose: bool) -> Option<String> {
    match rust_log.map(str::trim) {
        Some(env) if !env.is_empty() => Some(env.to_string()),
        _ if verbose => Some(VERBOSE_LOG_FILTER.to_string()),
        _ => None,
    }
}

/// Get the log directory path.
fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("trello-doing").join("logs"))
}

/// Log application shutdown.
pub fn shutdown() {
    tracing::debug!("trello-doing shutting down");
}
