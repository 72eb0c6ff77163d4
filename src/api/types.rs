//! Trello API response types.
//!
//! Only the handful of fields the report needs are modelled; everything else
//! the API sends back is ignored during decoding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An identifier/name pair.
///
/// Used for lists and cards, and as the identity of a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// The Trello object ID.
    #[serde(default)]
    pub id: String,
    /// The display name (may be empty).
    #[serde(default)]
    pub name: String,
}

impl Row {
    /// Create a new row.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A Trello board with its open lists.
///
/// Returned by `GET /1/members/me/boards`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// The board ID.
    #[serde(default)]
    pub id: String,
    /// The board name.
    #[serde(default)]
    pub name: String,
    /// The board's lists, in API order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lists: Vec<Row>,
}

impl Board {
    /// Create a new board.
    pub fn new(id: impl Into<String>, name: impl Into<String>, lists: Vec<Row>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lists,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
