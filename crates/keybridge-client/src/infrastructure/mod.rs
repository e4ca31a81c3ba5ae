//! Infrastructure layer: adapters between the session and the outside world.
//!
//! - [`ws_client`] – WebSocket transport and the connection/reconnect loop.
//! - [`log_history`] – the key history rendered as log lines.
//! - [`stdin_input`] – stdin lines and `:` commands as session events.
//! - [`recording`] – in-memory port implementations for tests.

pub mod log_history;
pub mod recording;
pub mod stdin_input;
pub mod ws_client;

pub use log_history::LogHistory;
pub use stdin_input::{read_lines, InputError, LineParser};
pub use ws_client::{run_client, ChannelTransport, RunSummary};
