//! # keybridge-core
//!
//! Shared library for KeyBridge containing the keystroke domain model, the
//! keyboard layout tables, and the JSON wire protocol spoken with the remote
//! keyboard-injection service.
//!
//! This crate has zero dependencies on sockets, async runtimes, or UI code.
//!
//! # Architecture overview (for beginners)
//!
//! KeyBridge is a remote keyboard: keys pressed (or text pasted) on the local
//! machine are turned into *keystroke messages* and sent to a service that
//! injects them into another computer.  The service replies once per
//! keystroke to say whether the injection succeeded.
//!
//! This crate (`keybridge-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure state with no I/O: the manual/physical modifier
//!   state, the immutable [`KeystrokeMessage`], and the connection state
//!   machine.
//!
//! - **`keymap`** – Keyboard layout data: which browser `keyCode` values are
//!   modifier keys, which characters need Shift, and the character → keyCode
//!   lookup table used when decomposing pasted text.
//!
//! - **`protocol`** – How keystrokes travel over the wire (JSON envelopes)
//!   and how acknowledgments are matched back to the keystroke that caused
//!   them.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `keybridge_core::KeystrokeMessage` instead of the full module path.
pub use domain::connection::{ConnectionState, ConnectionTracker, DisconnectOutcome};
pub use domain::keystroke::{KeyLocation, KeystrokeMessage, Modifier, ModifierSnapshot};
pub use domain::modifiers::{KeyState, ManualModifiers, ModifierState};
pub use keymap::layout::{KeyboardLayout, LayoutError};
pub use protocol::correlator::{Abandoned, AckCorrelator, CorrelationError, Resolved};
pub use protocol::messages::{
    InboundMessage, KeystrokeAck, KeystrokeFrame, OutboundMessage, ProtocolError,
};
pub use protocol::sequence::{SequenceCounter, SequenceId};
