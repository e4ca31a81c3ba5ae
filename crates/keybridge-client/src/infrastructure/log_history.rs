//! A [`HistoryView`] that writes the key history to the log.
//!
//! The command-line client has no screen to draw history cards on, so each
//! card becomes a log line: one when the keystroke is sent, one when its
//! acknowledgment arrives (or its connection drops).  Labels are kept until
//! then so the second line can name the key again.

use std::collections::HashMap;

use keybridge_core::SequenceId;
use tracing::{debug, info, warn};

use crate::application::ports::{ErrorKind, HistoryView};

/// History cards rendered as `tracing` events.
#[derive(Debug, Default)]
pub struct LogHistory {
    labels: HashMap<SequenceId, String>,
    succeeded: u64,
    failed: u64,
}

impl LogHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keystrokes the service reported as injected.
    pub fn succeeded(&self) -> u64 {
        self.succeeded
    }

    /// Keystrokes the service reported as failed.
    pub fn failed(&self) -> u64 {
        self.failed
    }
}

impl HistoryView for LogHistory {
    fn register_pending(&mut self, id: SequenceId, label: &str) {
        debug!(id, label, "key pending");
        self.labels.insert(id, label.to_string());
    }

    fn resolve_pending(&mut self, id: SequenceId, success: bool) {
        let label = self.labels.remove(&id).unwrap_or_default();
        if success {
            self.succeeded += 1;
            info!(id, key = %label, "key injected");
        } else {
            self.failed += 1;
            warn!(id, key = %label, "key injection failed");
        }
    }

    fn abandon_pending(&mut self, id: SequenceId) {
        let label = self.labels.remove(&id).unwrap_or_default();
        warn!(id, key = %label, "key never acknowledged; connection dropped");
    }

    fn show_connection_status(&mut self, connected: bool) {
        info!(connected, "connection status");
    }

    fn show_error(&mut self, kind: ErrorKind, message: &str) {
        warn!(%kind, "{message}");
    }

    fn clear_error(&mut self, kind: ErrorKind) {
        debug!(%kind, "error cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_counts_outcomes() {
        // Arrange
        let mut history = LogHistory::new();
        history.register_pending(0, "Shift");
        history.register_pending(1, "A");

        // Act
        history.resolve_pending(0, true);
        history.resolve_pending(1, false);

        // Assert
        assert_eq!(history.succeeded(), 1);
        assert_eq!(history.failed(), 1);
        assert!(history.labels.is_empty());
    }

    #[test]
    fn test_abandoned_card_is_forgotten_without_counting() {
        let mut history = LogHistory::new();
        history.register_pending(3, "b");

        history.abandon_pending(3);

        assert!(history.labels.is_empty());
        assert_eq!(history.succeeded() + history.failed(), 0);
    }
}
