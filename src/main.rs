//! trello-doing - print the in-progress lists and cards of your Trello boards.
//!
//! Reads the Trello API key and token from the `KEY` and `TOKEN` environment
//! variables.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use trello_doing::app;
use trello_doing::config::Settings;
use trello_doing::error::{format_error, Result};
use trello_doing::logging;

/// Print the in-progress lists and cards of your Trello boards.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Trello API base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Only show lists whose name matches this regex.
    #[arg(long)]
    pattern: Option<String>,

    /// Request timeout in seconds (0 disables it).
    #[arg(long)]
    timeout: Option<u64>,

    /// Settings file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write debug logs to the log directory.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match logging::init(cli.verbose) {
        Ok(Some(dir)) if cli.verbose => eprintln!("Logging to {}", dir.display()),
        Ok(_) => {}
        Err(e) => eprintln!("warning: logging disabled: {:#}", e),
    }

    let code = match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", format_error(&err).trim_end());
            ExitCode::from(err.exit_code())
        }
    };

    logging::shutdown();
    code
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_overrides(cli.base_url, cli.pattern, cli.timeout);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling");
            on_ctrl_c.cancel();
        }
    });

    let mut out = io::stdout().lock();
    app::run(&settings, &mut out, &cancel).await
}
