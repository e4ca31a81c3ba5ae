//! Domain layer: keystroke state with no I/O.
//!
//! - [`modifiers`] – manual one-shot modifiers and physical key-down tracking.
//! - [`keystroke`] – the immutable keystroke message sent on the wire.
//! - [`connection`] – connected/disconnected state and error-surfacing rules.

pub mod connection;
pub mod keystroke;
pub mod modifiers;
