//! Local input: lines of text from stdin, turned into session events.
//!
//! Each ordinary line is pasted followed by Enter.  Lines starting with `:`
//! are commands:
//!
//! | Line                   | Events                                          |
//! |------------------------|-------------------------------------------------|
//! | `:toggle ctrl`         | toggle the manual Ctrl modifier                 |
//! | `:key Ctrl+Alt+Delete` | toggle Ctrl and Alt, then press/release Delete  |
//! | `:key a`               | press/release `a`                               |
//! | `::text`               | paste the literal line `:text`                  |
//!
//! Modifier names are case-insensitive: `ctrl`/`control`, `alt`/`option`,
//! `shift`, `meta`/`win`/`cmd`/`super`.

use std::io::BufRead;

use keybridge_core::keymap::keycodes;
use keybridge_core::{KeyboardLayout, Modifier};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::application::{RawKeyEvent, SessionEvent};

/// Errors raised while parsing an input command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command {0:?} (expected :toggle or :key)")]
    UnknownCommand(String),

    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),

    #[error("unknown key {0:?}")]
    UnknownKey(String),

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
}

/// Named keys accepted by `:key`, with their browser keyCodes.
#[rustfmt::skip]
const NAMED_KEYS: &[(&str, u32)] = &[
    ("Enter", keycodes::ENTER), ("Escape", keycodes::ESCAPE), ("Tab", keycodes::TAB),
    ("Backspace", keycodes::BACKSPACE), ("Delete", keycodes::DELETE), ("Space", keycodes::SPACE),
    ("ArrowLeft", 37), ("ArrowUp", 38), ("ArrowRight", 39), ("ArrowDown", 40),
    ("Home", 36), ("End", 35), ("PageUp", 33), ("PageDown", 34), ("Insert", 45),
    ("F1", 112), ("F2", 113), ("F3", 114), ("F4", 115), ("F5", 116), ("F6", 117),
    ("F7", 118), ("F8", 119), ("F9", 120), ("F10", 121), ("F11", 122), ("F12", 123),
];

fn parse_modifier(name: &str) -> Option<Modifier> {
    match name.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Some(Modifier::Ctrl),
        "alt" | "option" => Some(Modifier::Alt),
        "shift" => Some(Modifier::Shift),
        "meta" | "win" | "cmd" | "super" => Some(Modifier::Meta),
        _ => None,
    }
}

/// Turns input lines into session events.
#[derive(Debug, Clone)]
pub struct LineParser {
    layout: KeyboardLayout,
    show_history: bool,
}

impl LineParser {
    pub fn new(layout: KeyboardLayout, show_history: bool) -> Self {
        Self {
            layout,
            show_history,
        }
    }

    /// Parses one line (without its trailing newline).
    pub fn parse_line(&self, line: &str) -> Result<Vec<SessionEvent>, InputError> {
        if let Some(literal) = line.strip_prefix("::") {
            return Ok(vec![self.paste(format!(":{literal}\n"))]);
        }
        let Some(command) = line.strip_prefix(':') else {
            return Ok(vec![self.paste(format!("{line}\n"))]);
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match name {
            "toggle" => {
                if arg.is_empty() {
                    return Err(InputError::MissingArgument(":toggle"));
                }
                let modifier =
                    parse_modifier(arg).ok_or_else(|| InputError::UnknownModifier(arg.to_string()))?;
                Ok(vec![SessionEvent::ToggleModifier(modifier)])
            }
            "key" => {
                if arg.is_empty() {
                    return Err(InputError::MissingArgument(":key"));
                }
                self.parse_chord(arg)
            }
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }

    fn paste(&self, text: String) -> SessionEvent {
        SessionEvent::Paste {
            text,
            show_history: self.show_history,
        }
    }

    /// `Ctrl+Alt+Delete`: every part but the last is a modifier.
    fn parse_chord(&self, chord: &str) -> Result<Vec<SessionEvent>, InputError> {
        let mut parts: Vec<&str> = chord.split('+').collect();
        // A trailing "+" names the plus key itself.
        if chord.ends_with("++") || chord == "+" {
            parts.retain(|p| !p.is_empty());
            parts.push("+");
        }
        let (key, modifiers) = parts
            .split_last()
            .ok_or(InputError::MissingArgument(":key"))?;

        let mut events = Vec::with_capacity(modifiers.len() + 2);
        for name in modifiers {
            let modifier =
                parse_modifier(name).ok_or_else(|| InputError::UnknownModifier(name.to_string()))?;
            events.push(SessionEvent::ToggleModifier(modifier));
        }

        let event = self.key_event(key)?;
        events.push(SessionEvent::KeyDown(event.clone()));
        events.push(SessionEvent::KeyUp(event));
        Ok(events)
    }

    fn key_event(&self, key: &str) -> Result<RawKeyEvent, InputError> {
        if let Some(&(name, code)) = NAMED_KEYS.iter().find(|(n, _)| n.eq_ignore_ascii_case(key)) {
            let key = if name == "Space" { " " } else { name };
            return Ok(RawKeyEvent::new(code, key));
        }

        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => self
                .layout
                .key_code_for(ch)
                .map(|code| RawKeyEvent::new(code, key))
                .ok_or_else(|| InputError::UnknownKey(key.to_string())),
            _ => Err(InputError::UnknownKey(key.to_string())),
        }
    }
}

/// Reads lines until EOF, forwarding parsed events.
///
/// This blocks; run it on a dedicated thread (see `main.rs`) so a pending
/// read never holds up runtime shutdown.  Bad commands are logged and
/// skipped.  Returning drops the sender, which tells the client loop that
/// input is finished.
pub fn read_lines<R: BufRead>(
    reader: R,
    parser: &LineParser,
    tx: UnboundedSender<SessionEvent>,
) -> std::io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        match parser.parse_line(&line) {
            Ok(events) => {
                for event in events {
                    if tx.send(event).is_err() {
                        debug!("client loop gone; stopping input reader");
                        return Ok(());
                    }
                }
            }
            Err(e) => warn!("ignoring input line: {e}"),
        }
    }
    debug!("input closed");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
