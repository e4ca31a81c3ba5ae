//! Ports: the traits the session uses to reach the outside world.
//!
//! The session depends only on these traits.  Infrastructure implementations
//! are injected at construction time, which makes the whole pipeline
//! unit-testable without a socket or a screen.

use keybridge_core::{OutboundMessage, SequenceId};
use thiserror::Error;

/// Errors a transport can report for a single send.
///
/// The session logs these and keeps going; there is no retry.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No connection is attached.
    #[error("transport is not connected")]
    NotConnected,

    /// The underlying channel rejected the message.
    #[error("send failed: {0}")]
    Send(String),
}

/// Ordered, fire-and-forget channel to the keyboard service.
///
/// Implementations must deliver messages in the order `send` is called.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    fn send(&mut self, message: OutboundMessage) -> Result<(), TransportError>;
}

/// Categories of user-visible error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service connection dropped unexpectedly.
    ConnectionLost,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConnectionLost => f.write_str("connection lost"),
        }
    }
}

/// The key history and status display.
pub trait HistoryView {
    /// A keystroke was sent and is awaiting its acknowledgment.
    fn register_pending(&mut self, id: SequenceId, label: &str);

    /// The acknowledgment for `id` arrived.
    fn resolve_pending(&mut self, id: SequenceId, success: bool);

    /// `id` was sent on a connection that has since dropped; no
    /// acknowledgment will arrive for it.
    fn abandon_pending(&mut self, id: SequenceId);

    fn show_connection_status(&mut self, connected: bool);

    fn show_error(&mut self, kind: ErrorKind, message: &str);

    fn clear_error(&mut self, kind: ErrorKind);
}
