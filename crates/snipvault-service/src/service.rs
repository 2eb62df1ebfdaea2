//! The snippet service
//!
//! All snippet-level business rules: CRUD, version history, restore,
//! selective version deletion, and selection tracking. The service keeps a
//! cached copy of the latest live snapshot via an internal store
//! subscription and re-resolves the selection after every list change.

use chrono::{DateTime, Duration, Utc};
use snipvault_core::model::now_ms;
use snipvault_core::{resolve_selection, Result, SnipError, Snippet, SnippetVersion};
use snipvault_store::live::SnapshotCallback;
use snipvault_store::{seed, OrderBy, SnippetPatch, SnippetStore, SubscriptionHandle};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::notify::{Notifier, TracingNotifier};

/// The editable fields of a snippet, as one unit
#[derive(Debug, Clone)]
pub struct SnippetEdit {
    pub title: String,
    pub language: String,
    pub code: String,
}

/// Live view state: the cached snapshot and the active selection
#[derive(Default)]
struct ViewState {
    snapshot: Vec<Snippet>,
    selected: Option<String>,
}

/// Snippet-level business rules over the persistent store
///
/// Cloning is cheap; clones share the store, the view state, and the
/// notifier.
#[derive(Clone)]
pub struct SnippetService {
    store: Arc<SnippetStore>,
    state: Arc<Mutex<ViewState>>,
    notifier: Arc<dyn Notifier>,
    /// Last issued timestamp; keeps `updated_at` strictly increasing even
    /// when successive mutations land within one millisecond
    clock: Arc<Mutex<DateTime<Utc>>>,
    // Keeps the internal snapshot/selection subscription alive
    _live: Arc<SubscriptionHandle>,
}

impl SnippetService {
    /// Build a service over an already-open store
    pub fn new(store: Arc<SnippetStore>) -> Result<Self> {
        Self::with_notifier(store, Arc::new(TracingNotifier))
    }

    /// Build a service with a custom notification sink
    pub fn with_notifier(store: Arc<SnippetStore>, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let state = Arc::new(Mutex::new(ViewState::default()));
        let shared = state.clone();
        // The initial delivery runs inside subscribe, so the cache and the
        // selection are populated before the constructor returns.
        let live = store.subscribe(
            OrderBy::UpdatedAt,
            Box::new(move |snapshot| {
                let mut view = lock_state(&shared);
                view.selected = resolve_selection(view.selected.as_deref(), snapshot);
                view.snapshot = snapshot.to_vec();
            }),
        )?;

        Ok(Self {
            store,
            state,
            notifier,
            clock: Arc::new(Mutex::new(DateTime::<Utc>::MIN_UTC)),
            _live: Arc::new(live),
        })
    }

    /// Open the store at `path`, seed example data on first launch, and
    /// build the service
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = Arc::new(SnippetStore::open(path)?);
        seed::seed_if_empty(&store)?;
        Self::new(store)
    }

    /// Create a snippet and select it
    ///
    /// Fails with `InvalidTitle` on a blank title and `PersistenceFailure`
    /// if the underlying insert fails.
    pub fn create(&self, title: &str, language: &str, code: &str) -> Result<Snippet> {
        self.validate_title(title)?;

        let mut snippet = Snippet::new(
            Uuid::new_v4().to_string(),
            title.to_string(),
            language.to_string(),
            code.to_string(),
        );
        let now = self.tick(None);
        snippet.created_at = now;
        snippet.updated_at = now;

        if let Err(err) = self.store.add(&snippet) {
            let err = SnipError::PersistenceFailure {
                op: "create".to_string(),
                reason: err.to_string(),
            };
            self.report_failure("Failed to create snippet", &err);
            return Err(err);
        }

        self.select(Some(&snippet.id));
        self.notifier.success("Snippet created");
        Ok(snippet)
    }

    /// Update a snippet's editable fields
    ///
    /// Appends the pre-update code to history (keyed by the old
    /// `updated_at`) and writes the new live fields in the same
    /// transaction; no reader observes one without the other.
    pub fn update(&self, id: &str, edit: SnippetEdit) -> Result<Snippet> {
        self.validate_title(&edit.title)?;

        let result = self.apply_update(id, edit);
        match &result {
            Ok(_) => self.notifier.success("Snippet updated"),
            Err(err) => self.report_failure("Failed to update snippet", err),
        }
        result
    }

    /// Delete a snippet and its entire history
    ///
    /// Deleting a missing id is a no-op. If the deleted snippet was
    /// selected, the selection repairs itself on the next live-list
    /// update.
    pub fn delete_snippet(&self, id: &str) -> Result<()> {
        match self.store.delete(id) {
            Ok(()) => {
                self.notifier.success("Snippet deleted");
                Ok(())
            }
            Err(err) => {
                self.report_failure("Failed to delete snippet", &err);
                Err(err)
            }
        }
    }

    /// Restore a prior version's code
    ///
    /// The version is resolved by its `created_at` key against the
    /// snippet's history; a key with no entry is `NotFound`. Restoring is
    /// a normal update: the state being replaced is itself appended to
    /// history, so history never shrinks here.
    pub fn restore_version(&self, id: &str, version: &SnippetVersion) -> Result<Snippet> {
        let result = self.lookup_and_restore(id, version.created_at);
        match &result {
            Ok(_) => self.notifier.success(&format!(
                "Restored version from {}",
                version.created_at.format("%Y-%m-%d %H:%M:%S")
            )),
            Err(err) => self.report_failure("Failed to restore version", err),
        }
        result
    }

    fn lookup_and_restore(&self, id: &str, key: DateTime<Utc>) -> Result<Snippet> {
        let current = self.store.get(id)?.ok_or_else(|| SnipError::NotFound {
            id: id.to_string(),
        })?;
        let stored = current
            .version_at(key)
            .cloned()
            .ok_or_else(|| SnipError::NotFound {
                id: id.to_string(),
            })?;

        self.apply_update(
            id,
            SnippetEdit {
                title: current.title,
                language: current.language,
                code: stored.code,
            },
        )
    }

    /// Remove a single history entry, identified by its `created_at` key
    ///
    /// Live fields and `updated_at` are untouched; a non-matching key is a
    /// no-op. Fails with `NotFound` if the snippet itself is absent.
    pub fn delete_version(&self, id: &str, version_created_at: DateTime<Utc>) -> Result<Snippet> {
        let result = self.store.update_with(id, |current| {
            let history: Vec<SnippetVersion> = current
                .history
                .iter()
                .filter(|v| v.created_at != version_created_at)
                .cloned()
                .collect();
            SnippetPatch {
                history: Some(history),
                ..Default::default()
            }
        });
        match &result {
            Ok(_) => self.notifier.success("Version deleted"),
            Err(err) => self.report_failure("Failed to delete version", err),
        }
        result
    }

    /// Set the active selection
    ///
    /// Existence is not validated eagerly: selecting an id with no live
    /// snippet just means [`SnippetService::selected`] is `None` until the
    /// next list change resolves it.
    pub fn select(&self, id: Option<&str>) {
        lock_state(&self.state).selected = id.map(String::from);
    }

    /// The currently selected snippet, if the selection refers to a live one
    pub fn selected(&self) -> Option<Snippet> {
        let view = lock_state(&self.state);
        let id = view.selected.as_deref()?;
        view.snapshot.iter().find(|s| s.id == id).cloned()
    }

    /// The current live list (most recently updated first)
    pub fn snippets(&self) -> Vec<Snippet> {
        lock_state(&self.state).snapshot.clone()
    }

    /// Subscribe to the live list
    ///
    /// Every observer shares the store's ordered view; the callback fires
    /// immediately with the current snapshot and after every change.
    pub fn subscribe(&self, callback: SnapshotCallback) -> Result<SubscriptionHandle> {
        self.store.subscribe(OrderBy::UpdatedAt, callback)
    }

    /// Direct access to the underlying store
    pub fn store(&self) -> &Arc<SnippetStore> {
        &self.store
    }

    /// The update itself, shared by `update` and `restore_version`
    fn apply_update(&self, id: &str, edit: SnippetEdit) -> Result<Snippet> {
        let clock = self.clock.clone();
        self.store.update_with(id, move |current| {
            let mut history = current.history.clone();
            history.push(current.freeze_current());
            SnippetPatch {
                title: Some(edit.title),
                language: Some(edit.language),
                code: Some(edit.code),
                updated_at: Some(tick_clock(&clock, Some(current.updated_at))),
                history: Some(history),
            }
        })
    }

    /// Issue a timestamp from the monotonic clock
    fn tick(&self, floor: Option<DateTime<Utc>>) -> DateTime<Utc> {
        tick_clock(&self.clock, floor)
    }

    fn validate_title(&self, title: &str) -> Result<()> {
        if title.trim().is_empty() {
            let err = SnipError::InvalidTitle {
                reason: "Title cannot be empty or whitespace-only".to_string(),
            };
            self.report_failure("Title rejected", &err);
            return Err(err);
        }
        Ok(())
    }

    /// Report a failure on the side-channel, with a retry hint when
    /// retrying the same action could succeed
    fn report_failure(&self, context: &str, err: &SnipError) {
        if err.is_retryable() {
            self.notifier.error(&format!("{context}: {err} (try again)"));
        } else {
            self.notifier.error(&format!("{context}: {err}"));
        }
    }
}

/// Issue the next timestamp: wall-clock now, pushed forward past both the
/// last issued value and `floor`
///
/// Strictly greater than the record's previous `updated_at`, so the history
/// entry keyed by that value can never collide with a later one even under
/// back-to-back edits within a single millisecond.
fn tick_clock(clock: &Mutex<DateTime<Utc>>, floor: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let mut last = clock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut candidate = now_ms();
    if candidate <= *last {
        candidate = *last + Duration::milliseconds(1);
    }
    if let Some(floor) = floor {
        if candidate <= floor {
            candidate = floor + Duration::milliseconds(1);
        }
    }
    *last = candidate;
    candidate
}

fn lock_state(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
