//! Live-query subscriptions
//!
//! In-process observers over the snippet table. A subscriber's callback is
//! invoked once immediately with the current snapshot and again after every
//! committed transaction, always with a fresh ordered snapshot. Dropping
//! the returned handle (or calling `unsubscribe`) deregisters the observer.

mod manager;

pub use manager::{SnapshotCallback, SubscriptionHandle, SubscriptionManager};
