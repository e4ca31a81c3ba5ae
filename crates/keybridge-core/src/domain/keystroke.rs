//! The normalized keystroke message and its building blocks.
//!
//! A [`KeystrokeMessage`] is the canonical representation of a single
//! keystroke sent to the remote keyboard-injection service.  Once built it is
//! never modified; everything the remote side needs (modifier flags, the key
//! itself, and which side of the keyboard it came from) is captured at
//! construction time.
//!
//! # JSON shape
//!
//! ```json
//! {"metaKey":false,"altKey":false,"shiftKey":true,"ctrlKey":false,
//!  "key":"A","keyCode":65,"location":null}
//! ```

use serde::{Deserialize, Serialize};

/// DOM `KeyboardEvent.location` value reported for the left-hand copy of a
/// duplicated key (e.g. left Shift).
pub const DOM_KEY_LOCATION_LEFT: u8 = 1;

/// DOM `KeyboardEvent.location` value reported for the right-hand copy of a
/// duplicated key.
pub const DOM_KEY_LOCATION_RIGHT: u8 = 2;

/// One of the four modifiers the remote service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Meta,
    Alt,
    Shift,
    Ctrl,
}

impl Modifier {
    /// All modifiers in wire order.
    pub const ALL: [Modifier; 4] = [Modifier::Meta, Modifier::Alt, Modifier::Shift, Modifier::Ctrl];

    /// The modifier a DOM key value names, if any (`"Control"` → `Ctrl`).
    pub fn from_key(key: &str) -> Option<Modifier> {
        match key {
            "Meta" | "OS" => Some(Modifier::Meta),
            "Alt" => Some(Modifier::Alt),
            "Shift" => Some(Modifier::Shift),
            "Control" => Some(Modifier::Ctrl),
            _ => None,
        }
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Modifier::Meta => "Meta",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::Ctrl => "Ctrl",
        };
        f.write_str(name)
    }
}

/// A point-in-time view of the four modifier flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ModifierSnapshot {
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
}

impl ModifierSnapshot {
    /// Returns `true` when no modifier is set.
    pub fn is_empty(&self) -> bool {
        !(self.meta || self.alt || self.shift || self.ctrl)
    }

    /// Reads a single flag.
    pub fn get(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Meta => self.meta,
            Modifier::Alt => self.alt,
            Modifier::Shift => self.shift,
            Modifier::Ctrl => self.ctrl,
        }
    }

    /// Per-flag logical OR.
    ///
    /// Used to merge the modifiers the OS reported natively with the ones the
    /// user asserted manually, so a modifier swallowed by the host still
    /// reaches the remote machine.
    pub fn union(self, other: ModifierSnapshot) -> ModifierSnapshot {
        ModifierSnapshot {
            meta: self.meta || other.meta,
            alt: self.alt || other.alt,
            shift: self.shift || other.shift,
            ctrl: self.ctrl || other.ctrl,
        }
    }
}

/// Which side of the keyboard a duplicated key was pressed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyLocation {
    Left,
    Right,
}

impl KeyLocation {
    /// Maps a DOM `KeyboardEvent.location` hint to a side.
    ///
    /// Only the left/right sentinels produce a location; standard and numpad
    /// keys (and anything unrecognised) yield `None`.
    pub fn from_dom_location(hint: u8) -> Option<KeyLocation> {
        match hint {
            DOM_KEY_LOCATION_LEFT => Some(KeyLocation::Left),
            DOM_KEY_LOCATION_RIGHT => Some(KeyLocation::Right),
            _ => None,
        }
    }
}

/// A single normalized keystroke, as sent to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeystrokeMessage {
    pub meta_key: bool,
    pub alt_key: bool,
    pub shift_key: bool,
    pub ctrl_key: bool,
    /// The key value: a printable character (`"a"`, `"!"`) or a key name
    /// (`"Enter"`, `"Shift"`).
    pub key: String,
    /// Browser `keyCode`, or `None` when the key has no known code.
    #[serde(default)]
    pub key_code: Option<u32>,
    /// Side of a duplicated key; `None` for everything else.
    #[serde(default)]
    pub location: Option<KeyLocation>,
}

impl KeystrokeMessage {
    /// Builds a keystroke from its parts.
    pub fn new(
        key: impl Into<String>,
        key_code: Option<u32>,
        modifiers: ModifierSnapshot,
        location: Option<KeyLocation>,
    ) -> Self {
        Self {
            meta_key: modifiers.meta,
            alt_key: modifiers.alt,
            shift_key: modifiers.shift,
            ctrl_key: modifiers.ctrl,
            key: key.into(),
            key_code,
            location,
        }
    }

    /// Returns the modifier flags carried by this keystroke.
    pub fn modifiers(&self) -> ModifierSnapshot {
        ModifierSnapshot {
            meta: self.meta_key,
            alt: self.alt_key,
            shift: self.shift_key,
            ctrl: self.ctrl_key,
        }
    }

    /// Human-readable label such as `Alt+Ctrl+Delete`, used for history cards.
    pub fn display_label(&self) -> String {
        let own = Modifier::from_key(&self.key);
        let mut parts: Vec<String> = Modifier::ALL
            .iter()
            .filter(|m| self.modifiers().get(**m))
            // A lone Ctrl keystroke reads "Ctrl", not "Ctrl+Control".
            .filter(|m| Some(**m) != own)
            .map(|m| m.to_string())
            .collect();
        let key = match (own, self.key.as_str()) {
            (Some(modifier), _) => modifier.to_string(),
            (None, " ") => "Space".to_string(),
            (None, "\n" | "\r") => "Enter".to_string(),
            (None, "\t") => "Tab".to_string(),
            (None, other) => other.to_string(),
        };
        parts.push(key);
        parts.join("+")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
