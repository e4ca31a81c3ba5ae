//! Character tables for a keyboard layout.
//!
//! Pasted text arrives as characters, but the remote service wants keystrokes.
//! A [`KeyboardLayout`] answers the two questions the paste decomposer asks
//! about each character:
//!
//! 1. **Does typing it need Shift?**  Uppercase letters always do; other
//!    characters do when they are in the layout's closed shift-symbol set
//!    (`!`, `@`, `{`, … on a US keyboard).
//! 2. **Which keyCode produces it?**  Looked up by the character's lowercase
//!    form, so `'A'` and `'a'` share code 65.  Characters with no entry have
//!    no code; that is not an error.
//!
//! # Layout files
//!
//! The built-in table is a US QWERTY layout.  A TOML file can replace the
//! shift-symbol set and add or override individual keycodes:
//!
//! ```toml
//! name = "us-intl"
//! shift_symbols = "~!@#$%^&*()_+{}|:\"<>?"
//!
//! [key_codes]
//! "§" = 192
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a layout file.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The layout file could not be read.
    #[error("failed to read layout file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse layout TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A `key_codes` entry is not a single lowercase character.
    #[error("invalid key_codes entry {0:?}: keys must be single lowercase characters")]
    InvalidKey(String),
}

/// Symbols that need Shift on a US QWERTY keyboard.
const US_SHIFT_SYMBOLS: &str = "~!@#$%^&*()_+{}|:\"<>?";

/// Character → keyCode pairs for a US QWERTY keyboard.
///
/// Shifted symbols map to the code of the key they live on (`'!'` → the `1`
/// key) so a pasted `!` can be reproduced as Shift + 49.
#[rustfmt::skip]
const US_KEY_CODES: &[(char, u32)] = &[
    // ── Letters (keyCode 65–90) ───────────────────────────────────────────────
    ('a', 65), ('b', 66), ('c', 67), ('d', 68), ('e', 69), ('f', 70), ('g', 71),
    ('h', 72), ('i', 73), ('j', 74), ('k', 75), ('l', 76), ('m', 77), ('n', 78),
    ('o', 79), ('p', 80), ('q', 81), ('r', 82), ('s', 83), ('t', 84), ('u', 85),
    ('v', 86), ('w', 87), ('x', 88), ('y', 89), ('z', 90),

    // ── Digit row (keyCode 48–57) and its shifted symbols ────────────────────
    ('0', 48), ('1', 49), ('2', 50), ('3', 51), ('4', 52),
    ('5', 53), ('6', 54), ('7', 55), ('8', 56), ('9', 57),
    (')', 48), ('!', 49), ('@', 50), ('#', 51), ('$', 52),
    ('%', 53), ('^', 54), ('&', 55), ('*', 56), ('(', 57),

    // ── Whitespace ────────────────────────────────────────────────────────────
    (' ', 32),
    ('\n', 13),
    ('\t', 9),

    // ── Punctuation (OEM keys) ───────────────────────────────────────────────
    (';', 186), (':', 186),
    ('=', 187), ('+', 187),
    (',', 188), ('<', 188),
    ('-', 189), ('_', 189),
    ('.', 190), ('>', 190),
    ('/', 191), ('?', 191),
    ('`', 192), ('~', 192),
    ('[', 219), ('{', 219),
    ('\\', 220), ('|', 220),
    (']', 221), ('}', 221),
    ('\'', 222), ('"', 222),
];

/// On-disk shape of a layout file.
#[derive(Debug, Deserialize)]
struct LayoutFile {
    name: Option<String>,
    shift_symbols: Option<String>,
    #[serde(default)]
    key_codes: HashMap<String, u32>,
}

/// Shift-symbol set plus character → keyCode table.
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    name: String,
    shift_symbols: HashSet<char>,
    key_codes: HashMap<char, u32>,
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::us_qwerty()
    }
}

impl KeyboardLayout {
    /// The built-in US QWERTY layout.
    pub fn us_qwerty() -> Self {
        Self {
            name: "us".to_string(),
            shift_symbols: US_SHIFT_SYMBOLS.chars().collect(),
            key_codes: US_KEY_CODES.iter().copied().collect(),
        }
    }

    /// Parses a layout file on top of the US defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Parse`] for malformed TOML and
    /// [`LayoutError::InvalidKey`] for a `key_codes` entry that is not a
    /// single lowercase character.
    pub fn from_toml_str(text: &str) -> Result<Self, LayoutError> {
        let file: LayoutFile = toml::from_str(text)?;
        let mut layout = Self::us_qwerty();

        if let Some(name) = file.name {
            layout.name = name;
        }
        if let Some(symbols) = file.shift_symbols {
            layout.shift_symbols = symbols.chars().collect();
        }
        for (key, code) in file.key_codes {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) if lowercase_of(ch) == Some(ch) => ch,
                _ => return Err(LayoutError::InvalidKey(key)),
            };
            layout.key_codes.insert(ch, code);
        }

        tracing::debug!(
            layout = %layout.name,
            shift_symbols = layout.shift_symbols.len(),
            key_codes = layout.key_codes.len(),
            "loaded keyboard layout"
        );
        Ok(layout)
    }

    /// Reads and parses a layout file.
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let text = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if typing `ch` requires the Shift modifier.
    pub fn needs_shift(&self, ch: char) -> bool {
        ch.is_uppercase() || self.shift_symbols.contains(&ch)
    }

    /// Looks up the keyCode for `ch` by its lowercase form.
    pub fn key_code_for(&self, ch: char) -> Option<u32> {
        lowercase_of(ch).and_then(|lower| self.key_codes.get(&lower).copied())
    }
}

/// Single-character lowercase form, if there is one.
///
/// A few characters lowercase to more than one char (`'İ'`); those have no
/// table entry.
fn lowercase_of(ch: char) -> Option<char> {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => Some(l),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_letters_need_shift() {
        let layout = KeyboardLayout::us_qwerty();
        assert!(layout.needs_shift('A'));
        assert!(layout.needs_shift('Z'));
        assert!(!layout.needs_shift('a'));
    }

    #[test]
    fn test_shift_symbols_need_shift() {
        let layout = KeyboardLayout::us_qwerty();
        for ch in "~!@#$%^&*()_+{}|:\"<>?".chars() {
            assert!(layout.needs_shift(ch), "{ch:?} must need shift");
        }
    }

    #[test]
    fn test_unshifted_symbols_and_digits_do_not_need_shift() {
        let layout = KeyboardLayout::us_qwerty();
        for ch in "1234567890-=[]\\;',./` \n".chars() {
            assert!(!layout.needs_shift(ch), "{ch:?} must not need shift");
        }
    }

    #[test]
    fn test_key_code_uses_lowercase_form() {
        let layout = KeyboardLayout::us_qwerty();
        assert_eq!(layout.key_code_for('a'), Some(65));
        assert_eq!(layout.key_code_for('A'), Some(65));
    }

    #[test]
    fn test_shifted_symbol_maps_to_base_key() {
        let layout = KeyboardLayout::us_qwerty();
        assert_eq!(layout.key_code_for('!'), Some(49));
        assert_eq!(layout.key_code_for('?'), Some(191));
    }

    #[test]
    fn test_unknown_character_has_no_code() {
        let layout = KeyboardLayout::us_qwerty();
        assert_eq!(layout.key_code_for('é'), None);
        assert_eq!(layout.key_code_for('😀'), None);
    }

    #[test]
    fn test_layout_file_overrides_shift_symbols() {
        // Arrange: a layout where only '!' needs shift
        let toml = r#"
            name = "minimal"
            shift_symbols = "!"
        "#;

        // Act
        let layout = KeyboardLayout::from_toml_str(toml).unwrap();

        // Assert
        assert_eq!(layout.name(), "minimal");
        assert!(layout.needs_shift('!'));
        assert!(!layout.needs_shift('@'));
        // Uppercase letters are unaffected by the symbol set.
        assert!(layout.needs_shift('Q'));
    }

    #[test]
    fn test_layout_file_adds_key_codes_on_top_of_defaults() {
        let toml = r#"
            [key_codes]
            "é" = 50
        "#;
        let layout = KeyboardLayout::from_toml_str(toml).unwrap();
        assert_eq!(layout.key_code_for('é'), Some(50));
        assert_eq!(layout.key_code_for('É'), Some(50));
        assert_eq!(layout.key_code_for('a'), Some(65));
        assert_eq!(layout.name(), "us");
    }

    #[test]
    fn test_layout_file_rejects_multi_char_key() {
        let toml = r#"
            [key_codes]
            "ab" = 1
        "#;
        let result = KeyboardLayout::from_toml_str(toml);
        assert!(matches!(result, Err(LayoutError::InvalidKey(_))));
    }

    #[test]
    fn test_layout_file_rejects_uppercase_key() {
        let toml = r#"
            [key_codes]
            "A" = 65
        "#;
        let result = KeyboardLayout::from_toml_str(toml);
        assert!(matches!(result, Err(LayoutError::InvalidKey(_))));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let result = KeyboardLayout::from_toml_str("shift_symbols = [");
        assert!(matches!(result, Err(LayoutError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = KeyboardLayout::load(Path::new("/nonexistent/keybridge/layout.toml"));
        assert!(matches!(result, Err(LayoutError::Io { .. })));
    }
}
