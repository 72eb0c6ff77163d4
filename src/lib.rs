//! trello-doing - print what is in progress on your Trello boards.
//!
//! The binary lists the member's open boards, keeps the lists whose name
//! matches a pattern (`(To Do|Doing)` by default) and prints their cards.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
