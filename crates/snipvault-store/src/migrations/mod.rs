//! Migration framework
//!
//! Provides:
//! - Embedded SQL migrations with optional per-record upgrade transforms
//! - A runner with checksum verification and idempotent application

mod checksums;
mod embedded;
mod runner;

pub use embedded::{get_migrations, Migration, RawSnippet};
pub use runner::{apply, apply_migrations};
