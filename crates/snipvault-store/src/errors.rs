//! Error constructors for snipvault-store
//!
//! Maps rusqlite and serde_json failures onto the canonical `SnipError`
//! taxonomy from snipvault-core.

use snipvault_core::SnipError;

/// The backing medium could not be opened, configured, or migrated
pub fn open_failed(err: rusqlite::Error) -> SnipError {
    SnipError::StorageUnavailable {
        reason: err.to_string(),
    }
}

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> SnipError {
    SnipError::StorageUnavailable {
        reason: format!("migration {} failed: {}", migration_id, reason),
    }
}

/// Create a checksum mismatch error for a previously applied migration
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> SnipError {
    SnipError::StorageUnavailable {
        reason: format!(
            "checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ),
    }
}

/// Create a persistence error from rusqlite::Error, tagged with the operation
pub fn from_rusqlite(op: &str, err: rusqlite::Error) -> SnipError {
    SnipError::PersistenceFailure {
        op: op.to_string(),
        reason: err.to_string(),
    }
}

/// Create a serialization error from serde_json::Error
pub fn serialization(err: serde_json::Error) -> SnipError {
    SnipError::Serialization {
        reason: err.to_string(),
    }
}

/// Classify an insert failure: primary-key collisions become `DuplicateKey`
pub fn insert_failed(id: &str, err: rusqlite::Error) -> SnipError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            SnipError::DuplicateKey { id: id.to_string() }
        }
        _ => from_rusqlite("add", err),
    }
}
