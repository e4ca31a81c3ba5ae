//! Modifier state: manual one-shot overrides plus physical key-down tracking.
//!
//! # Two kinds of state
//!
//! - [`ManualModifiers`] – four booleans the user can toggle from the UI when
//!   the host OS swallows a modifier (for example the Windows key opening the
//!   Start menu).  They apply to exactly the next emitted keystroke and are
//!   then consumed with [`ManualModifiers::take`].
//!
//! - [`KeyState`] – which physical keycodes are currently held down.  Only
//!   used to detect OS auto-repeat of a held modifier key, which must not be
//!   forwarded more than once per physical press.

use std::collections::HashMap;

use crate::domain::keystroke::{Modifier, ModifierSnapshot};

/// User-asserted modifier overrides with one-shot semantics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ManualModifiers {
    state: ModifierSnapshot,
}

impl ManualModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips one modifier.
    pub fn toggle(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Meta => self.state.meta = !self.state.meta,
            Modifier::Alt => self.state.alt = !self.state.alt,
            Modifier::Shift => self.state.shift = !self.state.shift,
            Modifier::Ctrl => self.state.ctrl = !self.state.ctrl,
        }
    }

    /// Forces one modifier on, regardless of its current value.
    pub fn assert(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Meta => self.state.meta = true,
            Modifier::Alt => self.state.alt = true,
            Modifier::Shift => self.state.shift = true,
            Modifier::Ctrl => self.state.ctrl = true,
        }
    }

    /// Resets all four modifiers to `false`.  Idempotent.
    pub fn clear_all(&mut self) {
        self.state = ModifierSnapshot::default();
    }

    /// Returns the current modifiers without consuming them.
    pub fn snapshot(&self) -> ModifierSnapshot {
        self.state
    }

    /// Returns the current modifiers and resets them.
    ///
    /// This is the single consumption point for one-shot semantics: every
    /// emission that uses manual modifiers goes through here.
    pub fn take(&mut self) -> ModifierSnapshot {
        std::mem::take(&mut self.state)
    }
}

/// Physical key-down state indexed by keycode.
///
/// Keycodes are a small bounded domain, so entries are flipped to `false` on
/// release rather than removed.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    pressed: HashMap<u32, bool>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records whether `key_code` is currently held down.
    pub fn mark_pressed(&mut self, key_code: u32, pressed: bool) {
        self.pressed.insert(key_code, pressed);
    }

    /// Returns `true` if `key_code` was pressed and not yet released.
    pub fn is_already_pressed(&self, key_code: u32) -> bool {
        self.pressed.get(&key_code).copied().unwrap_or(false)
    }
}

/// Manual overrides and physical key state, owned together by a session.
#[derive(Debug, Default, Clone)]
pub struct ModifierState {
    pub manual: ManualModifiers,
    pub keys: KeyState,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, modifier: Modifier) {
        self.manual.toggle(modifier);
    }

    pub fn mark_pressed(&mut self, key_code: u32, pressed: bool) {
        self.keys.mark_pressed(key_code, pressed);
    }

    pub fn is_already_pressed(&self, key_code: u32) -> bool {
        self.keys.is_already_pressed(key_code)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
