//! Snippet repository
//!
//! SQL-level reads and writes against the snippets table.

mod snippet_repo;
mod snippet_row;

pub use snippet_repo::{OrderBy, SnippetRepo};
