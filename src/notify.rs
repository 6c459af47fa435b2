//! User notification capability
//!
//! The engine never talks to a UI directly; failures that the user must act
//! on are pushed through a [`Notifier`] injected at construction.

use std::sync::Mutex;

/// How loudly a message should surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Sink for user-visible messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);
}

/// Notifier that forwards to the tracing subscriber. The default when an
/// embedder has no message surface of its own.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        }
    }
}

/// Notifier that records messages for inspection. Intended for tests and
/// embedders that render notifications themselves.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().expect("notifier lock").clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        self.messages
            .lock()
            .expect("notifier lock")
            .push((severity, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_notifier_records_in_order() {
        let notifier = CollectingNotifier::new();
        notifier.notify(Severity::Info, "loaded");
        notifier.notify(Severity::Error, "submit failed");

        let messages = notifier.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], (Severity::Info, "loaded".to_string()));
        assert_eq!(messages[1].0, Severity::Error);
    }
}
