//! Notification side-channel
//!
//! Human-readable success/failure messages emitted after each mutating
//! call. Informational only; never part of the functional contract. The
//! presentation layer decides how to surface them (toasts in the original
//! app), the default sink emits them as tracing events.

/// Sink for user-facing outcome messages
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default notifier backed by the tracing pipeline
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "snipvault::notify", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "snipvault::notify", "{message}");
    }
}
