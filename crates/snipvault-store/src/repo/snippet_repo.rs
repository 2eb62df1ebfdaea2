//! SQLite repository implementation
//!
//! Persists snippets to the snippets table. All functions take a plain
//! connection reference so they compose with transactions (`Transaction`
//! derefs to `Connection`).

use crate::errors::{from_rusqlite, insert_failed};
use crate::repo::snippet_row::{encode_history, hydrate, SnippetColumns};
use rusqlite::{Connection, OptionalExtension};
use snipvault_core::{Result, Snippet};

const SELECT_COLUMNS: &str = "id, title, language, code, created_at, updated_at, history";

/// Ordering key for table scans, always descending
///
/// Both columns are indexed. Ties break by id ascending so the ordering
/// is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    /// Most recently updated first (the display ordering)
    #[default]
    UpdatedAt,
    /// Most recently created first
    CreatedAt,
}

impl OrderBy {
    fn order_clause(self) -> &'static str {
        match self {
            OrderBy::UpdatedAt => "updated_at DESC, id ASC",
            OrderBy::CreatedAt => "created_at DESC, id ASC",
        }
    }

    /// Re-sort an existing snapshot into this ordering
    pub(crate) fn sort(self, snippets: &mut [Snippet]) {
        match self {
            OrderBy::UpdatedAt => {
                snippets.sort_by(|a, b| {
                    b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id))
                });
            }
            OrderBy::CreatedAt => {
                snippets.sort_by(|a, b| {
                    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
                });
            }
        }
    }
}

/// SQLite repository for snippets
pub struct SnippetRepo;

impl SnippetRepo {
    /// Insert a new snippet
    ///
    /// Fails with `DuplicateKey` if the id already exists.
    pub fn insert(conn: &Connection, snippet: &Snippet) -> Result<()> {
        conn.execute(
            "INSERT INTO snippets (id, title, language, code, created_at, updated_at, history)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                snippet.id,
                snippet.title,
                snippet.language,
                snippet.code,
                snippet.created_at.timestamp_millis(),
                snippet.updated_at.timestamp_millis(),
                encode_history(&snippet.history)?,
            ],
        )
        .map_err(|e| insert_failed(&snippet.id, e))?;

        Ok(())
    }

    /// Get a snippet by id; a missing id is a normal `None`, not an error
    pub fn get(conn: &Connection, id: &str) -> Result<Option<Snippet>> {
        let columns: Option<SnippetColumns> = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM snippets WHERE id = ?"),
                [id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| from_rusqlite("get", e))?;

        columns.map(hydrate).transpose()
    }

    /// Get all snippets, ordered by the requested key, descending
    pub fn get_all(conn: &Connection, order: OrderBy) -> Result<Vec<Snippet>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM snippets ORDER BY {}",
                order.order_clause()
            ))
            .map_err(|e| from_rusqlite("get_all", e))?;

        let columns: Vec<SnippetColumns> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })
            .map_err(|e| from_rusqlite("get_all", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite("get_all", e))?;

        columns.into_iter().map(hydrate).collect()
    }

    /// Write a snippet's mutable fields back (created_at never changes)
    ///
    /// Returns whether a row was updated.
    pub fn write(conn: &Connection, snippet: &Snippet) -> Result<bool> {
        let changed = conn
            .execute(
                "UPDATE snippets
                 SET title = ?2, language = ?3, code = ?4, updated_at = ?5, history = ?6
                 WHERE id = ?1",
                rusqlite::params![
                    snippet.id,
                    snippet.title,
                    snippet.language,
                    snippet.code,
                    snippet.updated_at.timestamp_millis(),
                    encode_history(&snippet.history)?,
                ],
            )
            .map_err(|e| from_rusqlite("update", e))?;

        Ok(changed > 0)
    }

    /// Delete a snippet; deleting a missing id is a no-op
    ///
    /// The whole record goes, history included. Returns whether a row
    /// was removed.
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn
            .execute("DELETE FROM snippets WHERE id = ?", [id])
            .map_err(|e| from_rusqlite("delete", e))?;

        Ok(changed > 0)
    }

    /// Count live snippets
    pub fn count(conn: &Connection) -> Result<u64> {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM snippets", [], |row| row.get(0))
            .map_err(|e| from_rusqlite("count", e))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipvault_core::SnipError;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        crate::migrations::apply_migrations(&mut conn).unwrap();
        conn
    }

    fn snippet(id: &str) -> Snippet {
        Snippet::new(
            id.to_string(),
            format!("Snippet {id}"),
            "rust".to_string(),
            "fn main() {}".to_string(),
        )
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let conn = setup();
        let original = snippet("snip-1");
        SnippetRepo::insert(&conn, &original).unwrap();

        let loaded = SnippetRepo::get(&conn, "snip-1").unwrap().unwrap();
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.title, original.title);
        assert_eq!(loaded.code, original.code);
        assert_eq!(loaded.created_at, loaded.updated_at);
        assert!(loaded.history.is_empty());
    }

    #[test]
    fn test_insert_duplicate_id_fails() {
        let conn = setup();
        SnippetRepo::insert(&conn, &snippet("snip-1")).unwrap();

        let err = SnippetRepo::insert(&conn, &snippet("snip-1")).unwrap_err();
        match err {
            SnipError::DuplicateKey { id } => assert_eq!(id, "snip-1"),
            other => panic!("Expected DuplicateKey, got {other:?}"),
        }
    }

    #[test]
    fn test_get_missing_is_none() {
        let conn = setup();
        assert!(SnippetRepo::get(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let conn = setup();
        SnippetRepo::insert(&conn, &snippet("snip-1")).unwrap();

        assert!(SnippetRepo::delete(&conn, "snip-1").unwrap());
        assert!(!SnippetRepo::delete(&conn, "snip-1").unwrap());
    }

    #[test]
    fn test_count() {
        let conn = setup();
        assert_eq!(SnippetRepo::count(&conn).unwrap(), 0);
        SnippetRepo::insert(&conn, &snippet("snip-1")).unwrap();
        SnippetRepo::insert(&conn, &snippet("snip-2")).unwrap();
        assert_eq!(SnippetRepo::count(&conn).unwrap(), 2);
    }
}
