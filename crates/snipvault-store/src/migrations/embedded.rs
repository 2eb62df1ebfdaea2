//! Embedded SQL migrations
//!
//! Migrations are embedded at compile time using include_str!. Besides
//! its SQL batch, a migration may carry a pure per-record transform that
//! the runner applies to every existing row, in the same transaction.

/// A snippet row as the upgrade transforms see it
///
/// Optional fields are the ones added after schema version 1; a record
/// written under an older schema has them unset until a transform fills
/// them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSnippet {
    pub id: String,
    pub title: String,
    pub language: String,
    pub code: String,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds; absent before schema version 2
    pub updated_at: Option<i64>,
    /// JSON array of versions; absent before schema version 2
    pub history: Option<String>,
}

/// Migration metadata
pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
    /// Pure per-record upgrade transform, run once over every existing row
    pub transform: Option<fn(RawSnippet) -> RawSnippet>,
}

/// Get all embedded migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_initial_schema",
            sql: include_str!("../../migrations/001_initial_schema.sql"),
            transform: None,
        },
        Migration {
            id: "002_versioning",
            sql: include_str!("../../migrations/002_versioning.sql"),
            transform: Some(init_versioning),
        },
    ]
}

/// v1 -> v2 backfill: records written before versioning existed get
/// `updated_at = created_at` and an empty history.
fn init_versioning(mut record: RawSnippet) -> RawSnippet {
    if record.updated_at.is_none() {
        record.updated_at = Some(record.created_at);
    }
    if record.history.is_none() {
        record.history = Some("[]".to_string());
    }
    record
}
