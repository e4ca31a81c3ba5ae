//! In-memory implementations of the session ports.
//!
//! [`RecordingTransport`] and [`RecordingHistory`] store every call they
//! receive in plain `Vec`s so tests can assert exactly what the session did,
//! and in what order.  They need no socket and no runtime.
//!
//! # Usage in tests
//!
//! ```
//! use keybridge_client::application::{KeyEventNormalizer, KeyboardSession, RawKeyEvent};
//! use keybridge_client::infrastructure::recording::{RecordingHistory, RecordingTransport};
//! use keybridge_core::KeyboardLayout;
//!
//! let mut session = KeyboardSession::new(
//!     RecordingTransport::new(),
//!     RecordingHistory::new(),
//!     KeyboardLayout::us_qwerty(),
//!     KeyEventNormalizer::default(),
//! );
//! session.on_connect();
//! session.key_down(&RawKeyEvent::new(65, "a"));
//!
//! assert_eq!(session.transport().keystrokes()[0].key, "a");
//! ```
//!
//! # `fail` flag
//!
//! Set `fail = true` to make every `send` return
//! [`TransportError::NotConnected`], for exercising error paths.

use keybridge_core::{KeystrokeFrame, KeystrokeMessage, OutboundMessage, SequenceId};

use crate::application::ports::{ErrorKind, HistoryView, Transport, TransportError};

/// A transport that records every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    /// Every successfully "sent" message, in send order.
    pub sent: Vec<OutboundMessage>,
    /// When `true`, `send` fails and records nothing.
    pub fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The keystroke frames sent so far, with their ids.
    pub fn frames(&self) -> Vec<KeystrokeFrame> {
        self.sent
            .iter()
            .filter_map(|m| match m {
                OutboundMessage::Keystroke(frame) => Some(frame.clone()),
                OutboundMessage::KeyRelease => None,
            })
            .collect()
    }

    /// The keystrokes sent so far, without ids.
    pub fn keystrokes(&self) -> Vec<KeystrokeMessage> {
        self.frames().into_iter().map(|f| f.keystroke).collect()
    }

    /// Number of `keyRelease` messages sent.
    pub fn releases(&self) -> usize {
        self.sent
            .iter()
            .filter(|m| matches!(m, OutboundMessage::KeyRelease))
            .count()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, message: OutboundMessage) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::NotConnected);
        }
        self.sent.push(message);
        Ok(())
    }
}

/// A history view that records every call.
#[derive(Debug, Default)]
pub struct RecordingHistory {
    /// `(id, label)` per `register_pending` call.
    pub registered: Vec<(SequenceId, String)>,
    /// `(id, success)` per `resolve_pending` call.
    pub resolved: Vec<(SequenceId, bool)>,
    pub abandoned: Vec<SequenceId>,
    /// Every connection status shown, oldest first.
    pub statuses: Vec<bool>,
    pub errors: Vec<(ErrorKind, String)>,
    pub cleared: Vec<ErrorKind>,
}

impl RecordingHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryView for RecordingHistory {
    fn register_pending(&mut self, id: SequenceId, label: &str) {
        self.registered.push((id, label.to_string()));
    }

    fn resolve_pending(&mut self, id: SequenceId, success: bool) {
        self.resolved.push((id, success));
    }

    fn abandon_pending(&mut self, id: SequenceId) {
        self.abandoned.push(id);
    }

    fn show_connection_status(&mut self, connected: bool) {
        self.statuses.push(connected);
    }

    fn show_error(&mut self, kind: ErrorKind, message: &str) {
        self.errors.push((kind, message.to_string()));
    }

    fn clear_error(&mut self, kind: ErrorKind) {
        self.cleared.push(kind);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
