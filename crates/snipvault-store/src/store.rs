//! The persistent snippet store
//!
//! Owns the SQLite connection and the live-query registry. All writes go
//! through here so every committed transaction is followed by a snapshot
//! publish to subscribers.

use crate::db;
use crate::errors::from_rusqlite;
use crate::live::{SnapshotCallback, SubscriptionHandle, SubscriptionManager};
use crate::migrations;
use crate::repo::{OrderBy, SnippetRepo};
use rusqlite::Connection;
use snipvault_core::{Result, SnipError, Snippet, SnippetVersion};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// A partial update: only the populated fields change on the record
///
/// `created_at` and `id` are immutable and therefore absent here.
#[derive(Debug, Default, Clone)]
pub struct SnippetPatch {
    pub title: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub history: Option<Vec<SnippetVersion>>,
}

impl SnippetPatch {
    /// Merge this patch over an existing record
    pub fn merge_into(self, mut snippet: Snippet) -> Snippet {
        if let Some(title) = self.title {
            snippet.title = title;
        }
        if let Some(language) = self.language {
            snippet.language = language;
        }
        if let Some(code) = self.code {
            snippet.code = code;
        }
        if let Some(updated_at) = self.updated_at {
            snippet.updated_at = updated_at;
        }
        if let Some(history) = self.history {
            snippet.history = history;
        }
        snippet
    }
}

/// Durable, schema-versioned snippet storage with live queries
///
/// The connection lives behind a mutex, so this process is the single
/// writer and transactions against the same record serialize: a
/// read-modify-write that starts after another finished always sees its
/// result.
pub struct SnippetStore {
    conn: Mutex<Connection>,
    live: Arc<SubscriptionManager>,
    /// Serializes snapshot-then-notify so deliveries are monotonic
    publish_gate: Mutex<()>,
}

impl fmt::Debug for SnippetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnippetStore")
            .field("subscribers", &self.live.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl SnippetStore {
    /// Open (or create) the store at the given path
    ///
    /// Configures the connection and applies any pending migrations;
    /// reopening an already-migrated store is a cheap no-op. Failures
    /// surface as `StorageUnavailable`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        db::configure(&conn)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        db::configure(&conn)?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        migrations::apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            live: SubscriptionManager::new(),
            publish_gate: Mutex::new(()),
        })
    }

    /// Number of live snippets
    pub fn count(&self) -> Result<u64> {
        SnippetRepo::count(&self.lock_conn())
    }

    /// Snapshot of all snippets, ordered by the requested key, descending
    pub fn get_all(&self, order: OrderBy) -> Result<Vec<Snippet>> {
        SnippetRepo::get_all(&self.lock_conn(), order)
    }

    /// Get a snippet by id; a missing id is `None`, not an error
    pub fn get(&self, id: &str) -> Result<Option<Snippet>> {
        SnippetRepo::get(&self.lock_conn(), id)
    }

    /// Insert a new snippet and return its id
    ///
    /// Fails with `DuplicateKey` on id collision.
    pub fn add(&self, snippet: &Snippet) -> Result<String> {
        SnippetRepo::insert(&self.lock_conn(), snippet)?;
        tracing::debug!(id = %snippet.id, "snippet added");
        self.publish();
        Ok(snippet.id.clone())
    }

    /// Merge the given fields into an existing record
    ///
    /// Fails with `NotFound` if the id does not exist; untouched fields
    /// keep their values.
    pub fn apply(&self, id: &str, patch: SnippetPatch) -> Result<Snippet> {
        self.update_with(id, move |_| patch)
    }

    /// Atomic read-modify-write against one record
    ///
    /// Loads the record, lets the caller derive a patch from it, and
    /// writes the merged record back, all inside a single transaction.
    /// No reader can observe the intermediate state.
    pub fn update_with<F>(&self, id: &str, patch_fn: F) -> Result<Snippet>
    where
        F: FnOnce(&Snippet) -> SnippetPatch,
    {
        let updated = {
            let mut conn = self.lock_conn();
            let tx = conn.transaction().map_err(|e| from_rusqlite("update", e))?;

            let current = SnippetRepo::get(&tx, id)?.ok_or_else(|| SnipError::NotFound {
                id: id.to_string(),
            })?;
            let updated = patch_fn(&current).merge_into(current);
            SnippetRepo::write(&tx, &updated)?;

            tx.commit().map_err(|e| from_rusqlite("update", e))?;
            updated
        };

        tracing::debug!(id = %updated.id, "snippet updated");
        self.publish();
        Ok(updated)
    }

    /// Delete a snippet and its entire history; missing ids are a no-op
    pub fn delete(&self, id: &str) -> Result<()> {
        let removed = SnippetRepo::delete(&self.lock_conn(), id)?;
        if removed {
            tracing::debug!(id, "snippet deleted");
            self.publish();
        }
        Ok(())
    }

    /// Register a live-query observer with its ordering descriptor
    ///
    /// The callback fires once immediately with the current snapshot and
    /// again after every committed mutation. Dropping the handle stops
    /// deliveries.
    pub fn subscribe(&self, order: OrderBy, callback: SnapshotCallback) -> Result<SubscriptionHandle> {
        // Hold the publish gate so the initial delivery cannot land after
        // a newer snapshot from a concurrent writer.
        let _gate = self.lock_gate();
        let snapshot = self.get_all(OrderBy::UpdatedAt)?;
        let handle = self.live.subscribe(order, callback);
        self.live.notify_one(&handle, &snapshot);
        Ok(handle)
    }

    /// Snapshot the table and fan it out to all subscribers
    fn publish(&self) {
        let _gate = self.lock_gate();
        match self.get_all(OrderBy::UpdatedAt) {
            Ok(snapshot) => self.live.notify(&snapshot),
            Err(err) => {
                tracing::warn!(error = %err, "live-query snapshot failed; skipping delivery")
            }
        }
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_gate(&self) -> MutexGuard<'_, ()> {
        self.publish_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
