//! Domain model for SnipVault

mod snippet;
mod version;

pub use snippet::Snippet;
pub use version::SnippetVersion;

use chrono::{DateTime, Utc};

/// Current time truncated to millisecond precision
///
/// Timestamps persist at millisecond precision, and a version's
/// `created_at` is compared by equality when deleting it; truncating at
/// the source keeps in-memory and reloaded values identical.
pub fn now_ms() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
