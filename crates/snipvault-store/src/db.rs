//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections.

use crate::errors::open_failed;
use rusqlite::Connection;
use snipvault_core::Result;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(open_failed)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(open_failed)
}

/// Configure a connection with the settings this store relies on
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .map_err(open_failed)?;

    // journal_mode returns the resulting mode as a row
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .map_err(open_failed)?;

    Ok(())
}
