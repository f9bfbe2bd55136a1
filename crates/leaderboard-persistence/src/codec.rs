//! Canonical leaderboard encoding.
//!
//! Writes are always a JSON array of score entries. Reads also accept the
//! legacy double-encoded form, a JSON string whose content is that array.
//! Anything else is corrupt.

use leaderboard_domain::{DomainError, Leaderboard, ScoreEntry};
use serde_json::Value;
use thiserror::Error;

use crate::error::Result;

/// Why a stored value could not be decoded
#[derive(Debug, Error)]
pub enum CorruptState {
    #[error("value is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("expected a JSON array, found {0}")]
    Shape(&'static str),

    #[error("malformed score entry: {0}")]
    Entry(#[source] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Unreadable(String),
}

/// Encode a leaderboard in the canonical form.
///
/// # Errors
///
/// Returns a serialization error; not expected for well-formed entries.
pub fn encode(board: &Leaderboard) -> Result<String> {
    Ok(serde_json::to_string(board.entries())?)
}

/// Decode a stored value, normalizing the legacy form.
///
/// # Errors
///
/// Returns [`CorruptState`] describing why the value was rejected.
pub fn decode(raw: &str) -> std::result::Result<Leaderboard, CorruptState> {
    let value: Value = serde_json::from_str(raw).map_err(CorruptState::Json)?;

    let value = match value {
        Value::String(inner) => serde_json::from_str(&inner).map_err(CorruptState::Json)?,
        other => other,
    };

    if !value.is_array() {
        return Err(CorruptState::Shape(kind(&value)));
    }

    let entries: Vec<ScoreEntry> = serde_json::from_value(value).map_err(CorruptState::Entry)?;
    Ok(Leaderboard::from_entries(entries)?)
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
