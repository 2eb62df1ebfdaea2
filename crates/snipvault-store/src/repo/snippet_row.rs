//! Row hydration
//!
//! Maps between snippet table rows and the domain model. Timestamps are
//! persisted as epoch milliseconds; history is a JSON array column.

use crate::errors::serialization;
use chrono::{DateTime, Utc};
use snipvault_core::{Result, Snippet, SnipError, SnippetVersion};

/// Encode a history sequence into its JSON column value
pub(crate) fn encode_history(history: &[SnippetVersion]) -> Result<String> {
    serde_json::to_string(history).map_err(serialization)
}

/// Decode the JSON history column
pub(crate) fn decode_history(raw: &str) -> Result<Vec<SnippetVersion>> {
    serde_json::from_str(raw).map_err(serialization)
}

/// Convert a persisted epoch-milliseconds value back to a timestamp
pub(crate) fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| SnipError::Serialization {
        reason: format!("timestamp out of range: {millis}"),
    })
}

/// The raw column tuple queried for one snippet
pub(crate) type SnippetColumns = (String, String, String, String, i64, i64, String);

/// Build a domain snippet from its raw column tuple
pub(crate) fn hydrate(columns: SnippetColumns) -> Result<Snippet> {
    let (id, title, language, code, created_at, updated_at, history) = columns;
    Ok(Snippet {
        id,
        title,
        language,
        code,
        created_at: millis_to_datetime(created_at)?,
        updated_at: millis_to_datetime(updated_at)?,
        history: decode_history(&history)?,
    })
}
