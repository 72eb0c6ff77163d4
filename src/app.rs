//! Wiring from settings to a finished report.

use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::TrelloClient;
use crate::config::{Credentials, Settings};
use crate::error::Result;
use crate::report::{self, ListFilter};

/// Validate the environment, build the client and write the report.
///
/// Credentials and the list pattern are checked before the client is built,
/// so a configuration error never reaches the network.
pub async fn run<W: Write>(
    settings: &Settings,
    out: &mut W,
    cancel: &CancellationToken,
) -> Result<()> {
    let credentials = Credentials::from_env(&settings.base_url)?;
    let filter = ListFilter::new(&settings.list_pattern)?;
    let client = TrelloClient::with_timeout(credentials, settings.timeout())?;

    info!(base_url = %settings.base_url, "Credentials validated");
    report::run(&client, out, &filter, cancel).await
}
