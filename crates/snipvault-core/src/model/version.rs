use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// SnippetVersion - a frozen prior state of a snippet's code
///
/// Appended to a snippet's history on every update, capturing the code as
/// it existed immediately before the update. `created_at` is the snippet's
/// `updated_at` at the moment this version was superseded; it is unique
/// within one snippet's history and doubles as the version's key for
/// deletion and restore operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetVersion {
    /// The code payload as it existed before the superseding update
    pub code: String,

    /// The superseded snippet's `updated_at` (this version's identity key)
    pub created_at: DateTime<Utc>,
}

impl SnippetVersion {
    /// Freeze a prior state into a version entry
    pub fn new(code: String, created_at: DateTime<Utc>) -> Self {
        Self { code, created_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_json() {
        let version = SnippetVersion::new("let x = 1;".to_string(), Utc::now());
        let json = serde_json::to_string(&version).unwrap();
        let back: SnippetVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);
    }
}
