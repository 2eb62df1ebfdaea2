use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::version::SnippetVersion;

/// Snippet - the primary entity
///
/// A short code sample tagged with a language. Snippets carry an
/// append-only history of prior revisions: each update freezes the
/// pre-update code into a [`SnippetVersion`] before the live fields change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Unique identifier (UUID v4), immutable after creation
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// Language identifier; an open set, any string is accepted here
    pub language: String,

    /// The code payload
    pub code: String,

    /// Timestamp set once at creation, never mutated
    pub created_at: DateTime<Utc>,

    /// Timestamp set at creation and reset on every successful update
    pub updated_at: DateTime<Utc>,

    /// Prior revisions, append-only, ordered by ascending `created_at`
    pub history: Vec<SnippetVersion>,
}

impl Snippet {
    /// Create a new Snippet with the given id and content
    ///
    /// The snippet starts with empty history and `created_at == updated_at`.
    pub fn new(id: String, title: String, language: String, code: String) -> Self {
        let now = super::now_ms();
        Self {
            id,
            title,
            language,
            code,
            created_at: now,
            updated_at: now,
            history: Vec::new(),
        }
    }

    /// Check if this snippet has any prior revisions
    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }

    /// Look up a history entry by its identity key
    pub fn version_at(&self, created_at: DateTime<Utc>) -> Option<&SnippetVersion> {
        self.history.iter().find(|v| v.created_at == created_at)
    }

    /// Freeze the current code into a history entry
    ///
    /// The entry's key is the current `updated_at`; callers must bump
    /// `updated_at` afterwards to keep history keys unique.
    pub fn freeze_current(&self) -> SnippetVersion {
        SnippetVersion::new(self.code.clone(), self.updated_at)
    }
}
