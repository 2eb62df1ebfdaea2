//! SnipVault store - durable snippet persistence over SQLite
//!
//! Provides:
//! - Connection management and pragmas
//! - Schema migrations (embedded SQL, checksummed, with per-record
//!   upgrade transforms)
//! - The snippet repository (point reads/writes, partial updates, scans)
//! - Live-query subscriptions (snapshot-on-change observers)
//! - Example-data seeding for empty stores

pub mod db;
pub mod errors;
pub mod live;
pub mod migrations;
pub mod repo;
pub mod seed;
mod store;

pub use live::SubscriptionHandle;
pub use repo::OrderBy;
pub use store::{SnippetPatch, SnippetStore};
