//! Browser `keyCode` constants.
//!
//! Reference: the legacy `KeyboardEvent.keyCode` values, which for the keys
//! below equal the Windows `VK_*` codes (`VK_SHIFT = 0x10`, `VK_LWIN = 0x5B`).

/// Either Shift key.
pub const SHIFT: u32 = 0x10;
/// Either Ctrl key.
pub const CTRL: u32 = 0x11;
/// Either Alt key.
pub const ALT: u32 = 0x12;
/// The OS key (Windows / Command), reported as `VK_LWIN`.
pub const META: u32 = 0x5B;

pub const BACKSPACE: u32 = 0x08;
pub const TAB: u32 = 0x09;
pub const ENTER: u32 = 0x0D;
pub const ESCAPE: u32 = 0x1B;
pub const SPACE: u32 = 0x20;
pub const DELETE: u32 = 0x2E;

/// Returns `true` for the four modifier keycodes.
///
/// Only these keys get auto-repeat suppression and a `keyRelease` on key-up.
pub fn is_modifier_key(key_code: u32) -> bool {
    matches!(key_code, SHIFT | CTRL | ALT | META)
}
