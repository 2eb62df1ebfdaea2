//! SnipVault core - domain model and shared facilities
//!
//! Provides:
//! - The `Snippet` / `SnippetVersion` domain model
//! - The canonical `SnipError` taxonomy with stable error codes
//! - The pure selection-resolution function
//! - The logging facility (single `init` entry point)

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod selection;

pub use errors::{Result, SnipError};
pub use model::{Snippet, SnippetVersion};
pub use selection::resolve_selection;
