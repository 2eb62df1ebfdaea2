//! Migration runner
//!
//! Applies migrations with checksum verification, per-record upgrade
//! transforms, and idempotent application. Each migration runs inside a
//! single transaction: SQL batch first, then the transform over every
//! existing record, then the bookkeeping insert.

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{get_migrations, Migration, RawSnippet};
use rusqlite::{Connection, OptionalExtension, Transaction};
use snipvault_core::Result;

/// Apply all embedded migrations to the database
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    apply(conn, &get_migrations())
}

/// Apply the given migrations in order
///
/// Already-applied migrations are skipped after their recorded checksum is
/// compared against the embedded SQL; re-running against a fully migrated
/// database is a cheap no-op.
pub fn apply(conn: &mut Connection, migrations: &[Migration]) -> Result<()> {
    create_schema_version_table(conn)?;

    for migration in migrations {
        apply_migration(conn, migration)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist
fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        )",
        [],
    )
    .map_err(|e| from_rusqlite("migrate", e))?;

    Ok(())
}

/// Apply a single migration if not already applied
fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let checksum = compute_checksum(migration.sql);

    let recorded: Option<Option<String>> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?",
            [migration.id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| from_rusqlite("migrate", e))?;

    if let Some(recorded) = recorded {
        // Already applied; the embedded SQL must not have changed since
        if let Some(recorded) = recorded {
            if recorded != checksum {
                return Err(checksum_mismatch(migration.id, &recorded, &checksum));
            }
        }
        return Ok(());
    }

    tracing::debug!(migration_id = migration.id, "applying migration");

    let tx = conn
        .transaction()
        .map_err(|e| from_rusqlite("migrate", e))?;

    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(migration.id, &e.to_string()))?;

    if let Some(transform) = migration.transform {
        run_transform(&tx, migration.id, transform)?;
    }

    let now = chrono::Utc::now().timestamp_millis();
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?, ?, ?)",
        rusqlite::params![migration.id, now, checksum],
    )
    .map_err(|e| from_rusqlite("migrate", e))?;

    tx.commit().map_err(|e| from_rusqlite("migrate", e))?;

    Ok(())
}

/// Run a pure per-record transform over every existing snippet row
fn run_transform(
    tx: &Transaction,
    migration_id: &str,
    transform: fn(RawSnippet) -> RawSnippet,
) -> Result<()> {
    let mut stmt = tx
        .prepare(
            "SELECT id, title, language, code, created_at, updated_at, history FROM snippets",
        )
        .map_err(|e| migration_error(migration_id, &e.to_string()))?;

    let rows: Vec<RawSnippet> = stmt
        .query_map([], |row| {
            Ok(RawSnippet {
                id: row.get(0)?,
                title: row.get(1)?,
                language: row.get(2)?,
                code: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
                history: row.get(6)?,
            })
        })
        .map_err(|e| migration_error(migration_id, &e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| migration_error(migration_id, &e.to_string()))?;
    drop(stmt);

    for row in rows {
        let upgraded = transform(row);
        tx.execute(
            "UPDATE snippets
             SET title = ?2, language = ?3, code = ?4, created_at = ?5,
                 updated_at = ?6, history = COALESCE(?7, history)
             WHERE id = ?1",
            rusqlite::params![
                upgraded.id,
                upgraded.title,
                upgraded.language,
                upgraded.code,
                upgraded.created_at,
                upgraded.updated_at,
                upgraded.history,
            ],
        )
        .map_err(|e| migration_error(migration_id, &e.to_string()))?;
    }

    Ok(())
}
