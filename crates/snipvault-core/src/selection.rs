//! Selection resolution
//!
//! The currently selected snippet id is transient service state, recomputed
//! against the live list after every list change. This module holds the pure
//! resolution rule so the policy is testable without a store.

use crate::model::Snippet;

/// Resolve the active selection against the current live list
///
/// Rules, in order:
/// - empty list resolves to no selection;
/// - a current selection that still refers to a live snippet is kept;
/// - anything else (cleared, dangling after a delete, or never set)
///   resolves to the first snippet in the live ordering.
///
/// The result therefore always refers to a live snippet or is `None`.
pub fn resolve_selection(current: Option<&str>, live: &[Snippet]) -> Option<String> {
    if live.is_empty() {
        return None;
    }
    if let Some(id) = current {
        if live.iter().any(|s| s.id == id) {
            return Some(id.to_string());
        }
    }
    Some(live[0].id.clone())
}
