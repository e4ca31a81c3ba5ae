//! Key event normalization: raw key-down/key-up events to keystrokes.
//!
//! The normalizer decides *whether* and *what* to forward; the session does
//! the registering and sending.  It owns no state of its own: physical key
//! state and manual modifiers live in the [`ModifierState`] it is handed.
//!
//! # Key-down rules
//!
//! 1. Disconnected → ignored, nothing recorded.
//! 2. A modifier key that is already held, or that the source flags as an
//!    auto-repeat → ignored.  One physical press is forwarded at most once,
//!    even when the press itself happened while disconnected.
//! 3. Otherwise the key is marked pressed and a keystroke is built with each
//!    native modifier OR-ed with its manual override.  Manual modifiers are
//!    consumed.
//!
//! # Key-up rules
//!
//! The key is always marked released, even while disconnected.  Releasing a
//! modifier key while connected asks the service to release all modifiers.

use keybridge_core::keymap::is_modifier_key;
use keybridge_core::{KeyLocation, KeystrokeMessage, ModifierSnapshot, ModifierState};

use crate::domain::MetaChordPolicy;

/// A key event as reported by the local input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub key_code: u32,
    /// Key value (`"a"`, `"Enter"`, `"Shift"`).
    pub key: String,
    pub meta_key: bool,
    pub alt_key: bool,
    pub shift_key: bool,
    pub ctrl_key: bool,
    /// DOM `KeyboardEvent.location`: 0 standard, 1 left, 2 right, 3 numpad.
    pub location: u8,
    /// Set by the input source for OS auto-repeat events.  Only modifier
    /// repeats are suppressed.
    pub repeat: bool,
}

impl RawKeyEvent {
    /// A plain event with no modifiers held, at the standard location.
    pub fn new(key_code: u32, key: impl Into<String>) -> Self {
        Self {
            key_code,
            key: key.into(),
            meta_key: false,
            alt_key: false,
            shift_key: false,
            ctrl_key: false,
            location: 0,
            repeat: false,
        }
    }

    pub fn with_location(mut self, location: u8) -> Self {
        self.location = location;
        self
    }

    pub fn with_modifiers(mut self, modifiers: ModifierSnapshot) -> Self {
        self.meta_key = modifiers.meta;
        self.alt_key = modifiers.alt;
        self.shift_key = modifiers.shift;
        self.ctrl_key = modifiers.ctrl;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Modifiers the OS reported as held.
    pub fn native_modifiers(&self) -> ModifierSnapshot {
        ModifierSnapshot {
            meta: self.meta_key,
            alt: self.alt_key,
            shift: self.shift_key,
            ctrl: self.ctrl_key,
        }
    }
}

/// What the session should do with a key-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDownDecision {
    Ignore,
    Forward {
        keystroke: KeystrokeMessage,
        /// Register with the correlator and history view.
        track: bool,
    },
}

/// What the session should do with a key-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUpDecision {
    Nothing,
    ReleaseModifiers,
}

/// Stateless key-event rules, parameterised by the meta-chord policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyEventNormalizer {
    policy: MetaChordPolicy,
}

impl KeyEventNormalizer {
    pub fn new(policy: MetaChordPolicy) -> Self {
        Self { policy }
    }

    pub fn key_down(
        &self,
        event: &RawKeyEvent,
        connected: bool,
        modifiers: &mut ModifierState,
    ) -> KeyDownDecision {
        if !connected {
            return KeyDownDecision::Ignore;
        }

        let is_modifier = is_modifier_key(event.key_code);
        if is_modifier && (event.repeat || modifiers.is_already_pressed(event.key_code)) {
            tracing::trace!(key_code = event.key_code, "suppressed modifier repeat");
            return KeyDownDecision::Ignore;
        }
        modifiers.mark_pressed(event.key_code, true);

        let location = KeyLocation::from_dom_location(event.location);

        let track = match (self.policy, event.meta_key) {
            (_, false) | (MetaChordPolicy::ForwardAll, true) => true,
            (MetaChordPolicy::TrackWithoutMeta, true) => false,
            (MetaChordPolicy::Suppress, true) => {
                // Dropped chords still consume the one-shot modifiers.
                modifiers.manual.clear_all();
                return KeyDownDecision::Ignore;
            }
        };

        let merged = event.native_modifiers().union(modifiers.manual.take());
        KeyDownDecision::Forward {
            keystroke: KeystrokeMessage::new(
                event.key.clone(),
                Some(event.key_code),
                merged,
                location,
            ),
            track,
        }
    }

    pub fn key_up(
        &self,
        event: &RawKeyEvent,
        connected: bool,
        modifiers: &mut ModifierState,
    ) -> KeyUpDecision {
        modifiers.mark_pressed(event.key_code, false);
        if connected && is_modifier_key(event.key_code) {
            KeyUpDecision::ReleaseModifiers
        } else {
            KeyUpDecision::Nothing
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
