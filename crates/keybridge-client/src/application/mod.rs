//! Application layer: the keyboard session and the pure rules it applies.
//!
//! - [`normalizer`] – raw key-down/key-up events to keystroke decisions.
//! - [`paste`] – pasted text to a keystroke sequence.
//! - [`ports`] – the [`Transport`] and [`HistoryView`] traits.
//! - [`session`] – [`KeyboardSession`], which owns all per-connection state.

pub mod normalizer;
pub mod paste;
pub mod ports;
pub mod session;

pub use normalizer::{KeyDownDecision, KeyEventNormalizer, KeyUpDecision, RawKeyEvent};
pub use paste::{PasteDecomposer, PasteKeystroke};
pub use ports::{ErrorKind, HistoryView, Transport, TransportError};
pub use session::{Disposition, KeyboardSession, SessionEvent};
