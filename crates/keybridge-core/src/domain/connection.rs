//! Connection state of the remote keyboard service.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──connect──► Connected ──disconnect──► Disconnected ──► …
//! ```
//!
//! There is no terminal state while the session is open: the client may
//! reconnect any number of times.  Every keystroke forward is gated on
//! [`ConnectionState::Connected`].
//!
//! # Intentional shutdown
//!
//! When the local user asks the remote machine to power down, the service
//! closes the connection as a side effect.  That disconnect is expected and
//! must not be reported as an error, so the tracker remembers that a
//! shutdown was requested and suppresses the next error report.

/// Whether the remote keyboard service is reachable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport connection (initial state).
    #[default]
    Disconnected,
    /// Transport connected; keystrokes are forwarded.
    Connected,
}

/// What the session should tell the user about a disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// The disconnect was self-initiated; stay quiet.
    Suppressed,
    /// Surface a connection-lost error with this reason.
    ConnectionLost(String),
}

/// Connection state plus the "shutdown requested" flag.
#[derive(Debug, Default, Clone)]
pub struct ConnectionTracker {
    state: ConnectionState,
    shutdown_requested: bool,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Marks the upcoming disconnect as intentional.
    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Transport connected.
    ///
    /// A fresh connection starts with no pending shutdown request.
    pub fn on_connect(&mut self) {
        self.state = ConnectionState::Connected;
        self.shutdown_requested = false;
    }

    /// Transport disconnected with `reason`.
    pub fn on_disconnect(&mut self, reason: &str) -> DisconnectOutcome {
        self.state = ConnectionState::Disconnected;
        if self.shutdown_requested {
            DisconnectOutcome::Suppressed
        } else {
            DisconnectOutcome::ConnectionLost(reason.to_string())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
