//! Trello API client and types.
//!
//! This module provides the interface for reading boards, lists and cards
//! from the Trello REST API.

mod client;
mod error;
mod types;

pub use client::{TrelloApi, TrelloClient};
pub use error::{ApiError, Result};
pub use types::{Board, Row};
