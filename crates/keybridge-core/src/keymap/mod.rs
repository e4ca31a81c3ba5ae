//! Keyboard layout data.
//!
//! The wire representation of a key is the browser `KeyboardEvent.keyCode`
//! value, which on a US layout matches the Windows Virtual-Key code for the
//! same key.  [`keycodes`] names the handful of codes the pipeline reasons
//! about; [`layout`] holds the character tables used to decompose pasted text.

pub mod keycodes;
pub mod layout;

pub use keycodes::is_modifier_key;
pub use layout::KeyboardLayout;
