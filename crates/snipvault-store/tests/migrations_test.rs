// Migration framework integration tests
// Covers: idempotent application, the v1 -> v2 versioning backfill,
// and checksum verification of already-applied migrations.

use rusqlite::Connection;
use snipvault_core::SnipError;
use snipvault_store::migrations::{apply, apply_migrations, get_migrations, Migration};

fn open() -> Connection {
    Connection::open_in_memory().unwrap()
}

#[test]
fn test_apply_migrations_is_idempotent() {
    let mut conn = open();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();

    let applied: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(applied, 2);
}

#[test]
fn test_v2_backfills_legacy_records() {
    let mut conn = open();
    let migrations = get_migrations();

    // A store still on schema version 1, with one record
    apply(&mut conn, &migrations[..1]).unwrap();
    conn.execute(
        "INSERT INTO snippets (id, title, language, code, created_at)
         VALUES ('legacy-1', 'Legacy', 'javascript', 'var x = 1;', 1600000000000)",
        [],
    )
    .unwrap();

    // Upgrading runs the init_versioning transform over the existing row
    apply(&mut conn, &migrations).unwrap();

    let (updated_at, history): (i64, String) = conn
        .query_row(
            "SELECT updated_at, history FROM snippets WHERE id = 'legacy-1'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(updated_at, 1600000000000);
    assert_eq!(history, "[]");
}

#[test]
fn test_backfill_leaves_new_records_alone() {
    let mut conn = open();
    apply_migrations(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO snippets (id, title, language, code, created_at, updated_at, history)
         VALUES ('snip-1', 'New', 'rust', 'fn main() {}', 1000, 2000, '[]')",
        [],
    )
    .unwrap();

    // Re-running the migrations must not rewrite anything
    apply_migrations(&mut conn).unwrap();

    let updated_at: i64 = conn
        .query_row(
            "SELECT updated_at FROM snippets WHERE id = 'snip-1'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(updated_at, 2000);
}

#[test]
fn test_tampered_migration_is_rejected() {
    let mut conn = open();
    apply_migrations(&mut conn).unwrap();

    let tampered = Migration {
        id: "001_initial_schema",
        sql: "SELECT 1;",
        transform: None,
    };
    let err = apply(&mut conn, &[tampered]).unwrap_err();
    match err {
        SnipError::StorageUnavailable { reason } => {
            assert!(reason.contains("checksum mismatch"));
        }
        other => panic!("Expected StorageUnavailable, got {other:?}"),
    }
}
