//! The in-progress report.
//!
//! Walks boards, keeps the lists whose name matches a [`ListFilter`], fetches
//! their cards and writes one indented line per board, list and card:
//!
//! ```text
//! 📋Boardy
//!   📃Doing
//!     🪧Card 1
//! ```

use std::io::Write;

use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::api::TrelloApi;
use crate::config::{self, DEFAULT_LIST_PATTERN};
use crate::error::Result;

const BOARD_PREFIX: &str = "📋";
const LIST_PREFIX: &str = "  📃";
const CARD_PREFIX: &str = "    🪧";

/// Selects which lists appear in the report, by name.
#[derive(Debug, Clone)]
pub struct ListFilter {
    pattern: Regex,
}

impl ListFilter {
    /// Build a filter from a regular expression.
    ///
    /// A list is kept when the pattern matches anywhere in its name.
    pub fn new(pattern: &str) -> config::Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Check whether a list with this name belongs in the report.
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_LIST_PATTERN).expect("default list pattern is valid"),
        }
    }
}

/// Write the report for every open board to `out`.
///
/// Stops at the first error and returns it unchanged. Lines already written
/// stay written; later boards are not visited.
#[instrument(skip_all)]
pub async fn run<A, W>(
    api: &A,
    out: &mut W,
    filter: &ListFilter,
    cancel: &CancellationToken,
) -> Result<()>
where
    A: TrelloApi + ?Sized,
    W: Write,
{
    let boards = api.list_boards(cancel).await?;
    info!(boards = boards.len(), "Building report");

    for board in &boards {
        writeln!(out, "{}{}", BOARD_PREFIX, board)?;

        for list in board.lists.iter().filter(|list| filter.matches(&list.name)) {
            writeln!(out, "{}{}", LIST_PREFIX, list)?;

            let cards = api.list_cards(list, cancel).await?;
            debug!(board = %board.id, list = %list.id, cards = cards.len(), "Listed cards");

            for card in &cards {
                writeln!(out, "{}{}", CARD_PREFIX, card)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
