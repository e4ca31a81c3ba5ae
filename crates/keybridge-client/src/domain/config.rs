//! Client configuration types.
//!
//! [`ClientConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (see `main.rs`) or from defaults
//! (useful for local development and tests).

use std::str::FromStr;
use std::time::Duration;

use keybridge_core::KeyboardLayout;
use thiserror::Error;

/// Errors raised while building a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--meta-chord` named an unknown policy.
    #[error("unknown meta-chord policy {0:?} (expected forward-all, track-without-meta, or suppress)")]
    UnknownMetaChordPolicy(String),

    /// The server URL does not use a WebSocket scheme.
    #[error("server URL must start with ws:// or wss://, got {0:?}")]
    InvalidUrl(String),
}

/// What to do with a key-down that arrives while the OS/meta key is natively
/// held.
///
/// Native meta chords are often reserved by the local OS (Cmd+Tab, Win+L).
/// Which of them should reach the remote machine is a deployment choice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MetaChordPolicy {
    /// Forward and track every key-down, meta chords included.
    #[default]
    ForwardAll,
    /// Forward meta chords but do not track them or suppress the local
    /// default action.  The service must not acknowledge untracked keystrokes
    /// for FIFO correlation to stay aligned.
    TrackWithoutMeta,
    /// Drop meta chords locally; physical key state is still recorded.
    Suppress,
}

impl FromStr for MetaChordPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward-all" => Ok(MetaChordPolicy::ForwardAll),
            "track-without-meta" => Ok(MetaChordPolicy::TrackWithoutMeta),
            "suppress" => Ok(MetaChordPolicy::Suppress),
            other => Err(ConfigError::UnknownMetaChordPolicy(other.to_string())),
        }
    }
}

/// All runtime configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the remote keyboard service.
    pub server_url: String,

    /// Character tables used to decompose pasted text.
    pub layout: KeyboardLayout,

    /// Whether pasted characters get individual history cards.
    ///
    /// Large pastes produce one card per character (plus one per synthetic
    /// Shift), which can flood the history view.
    pub paste_history: bool,

    /// Handling of key-downs with the native meta key held.
    pub meta_chord_policy: MetaChordPolicy,

    /// Delay between reconnect attempts after the connection drops.
    pub reconnect_interval: Duration,

    /// In one-shot mode, how long to wait for outstanding acknowledgments
    /// before exiting.
    pub ack_timeout: Duration,
}

impl ClientConfig {
    /// Checks settings that cannot be expressed in the type system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl(self.server_url.clone()));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    /// | Field              | Default                          |
    /// |--------------------|----------------------------------|
    /// | server_url         | `ws://127.0.0.1:8000/keystrokes` |
    /// | layout             | US QWERTY                        |
    /// | paste_history      | `true`                           |
    /// | meta_chord_policy  | `ForwardAll`                     |
    /// | reconnect_interval | 3 seconds                        |
    /// | ack_timeout        | 10 seconds                       |
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8000/keystrokes".to_string(),
            layout: KeyboardLayout::us_qwerty(),
            paste_history: true,
            meta_chord_policy: MetaChordPolicy::ForwardAll,
            reconnect_interval: Duration::from_secs(3),
            ack_timeout: Duration::from_secs(10),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
