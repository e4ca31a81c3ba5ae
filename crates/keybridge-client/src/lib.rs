//! keybridge-client library crate.
//!
//! This crate turns local keyboard activity into keystrokes for a remote
//! keyboard-injection service and tracks the service's replies.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Local input (key events, pasted text)
//!         ↓
//! [keybridge-client]
//!   ├── domain/           ClientConfig, MetaChordPolicy
//!   ├── application/      KeyboardSession: normalizer, paste decomposer,
//!   │                     ack correlation, connection gating
//!   └── infrastructure/
//!         ├── ws_client/   WebSocket transport + reconnect loop
//!         ├── log_history/ HistoryView backed by tracing
//!         └── stdin_input/ stdin lines → paste events
//!         ↓
//! Remote keyboard service (JSON over WebSocket)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `keybridge-core` only; it talks to
//!   the outside world through the [`application::Transport`] and
//!   [`application::HistoryView`] traits.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tungstenite`.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: the keyboard session and its event handlers.
pub mod application;

/// Infrastructure layer: WebSocket transport, logging history, stdin input.
pub mod infrastructure;
