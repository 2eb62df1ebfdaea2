//! SnipVault service - snippet-level business rules
//!
//! The only component the presentation layer talks to. Wraps the
//! persistent store with CRUD and version-history operations, tracks the
//! active selection against the live list, and reports outcomes on a
//! notification side-channel.

pub mod notify;
mod service;

pub use notify::{Notifier, TracingNotifier};
pub use service::{SnippetEdit, SnippetService};
