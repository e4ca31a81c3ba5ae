//! Paste decomposition: pasted text to an equivalent keystroke sequence.
//!
//! For every character, in order:
//!
//! 1. If it needs Shift (uppercase letter or layout shift symbol), manual
//!    Shift is asserted and a synthetic `Shift` keystroke is emitted first.
//! 2. The character itself is emitted with the current manual modifiers,
//!    its keyCode looked up by lowercase form, and no location.
//! 3. If Shift was asserted, manual modifiers are consumed *after* the
//!    character, ending the one-shot assertion.
//!
//! Characters without a keyCode are emitted with `keyCode: null` rather than
//! dropped, so the number of keystrokes (and acknowledgments) always follows
//! from the text: one per character plus one per shifted character.

use keybridge_core::keymap::keycodes;
use keybridge_core::{KeyboardLayout, KeystrokeMessage, ManualModifiers, Modifier};

/// One keystroke produced from pasted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteKeystroke {
    pub keystroke: KeystrokeMessage,
    /// `true` for the Shift keystroke inserted before a shifted character.
    pub synthetic: bool,
}

/// Splits text into keystrokes using a keyboard layout.
#[derive(Debug, Clone, Copy)]
pub struct PasteDecomposer<'a> {
    layout: &'a KeyboardLayout,
}

impl<'a> PasteDecomposer<'a> {
    pub fn new(layout: &'a KeyboardLayout) -> Self {
        Self { layout }
    }

    /// Decomposes `text`, reading and updating the manual modifiers.
    pub fn decompose(&self, text: &str, manual: &mut ManualModifiers) -> Vec<PasteKeystroke> {
        let mut out = Vec::with_capacity(text.len());

        for ch in text.chars() {
            let needs_shift = self.layout.needs_shift(ch);

            if needs_shift {
                manual.assert(Modifier::Shift);
                out.push(PasteKeystroke {
                    keystroke: KeystrokeMessage::new(
                        "Shift",
                        Some(keycodes::SHIFT),
                        manual.snapshot(),
                        None,
                    ),
                    synthetic: true,
                });
            }

            out.push(PasteKeystroke {
                keystroke: KeystrokeMessage::new(
                    ch.to_string(),
                    self.layout.key_code_for(ch),
                    manual.snapshot(),
                    None,
                ),
                synthetic: false,
            });

            if needs_shift {
                manual.clear_all();
            }
        }

        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
