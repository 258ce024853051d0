//! Key Classification
//!
//! Legacy `keyCode` values for keys that must not disturb validation
//! state while the user navigates or chords.

/// Tab
pub const TAB: u32 = 9;
/// Pause/Break
pub const PAUSE: u32 = 19;
/// Shift
pub const SHIFT: u32 = 16;
/// Control
pub const CONTROL: u32 = 17;
/// Alt
pub const ALT: u32 = 18;
/// Caps Lock
pub const CAPS_LOCK: u32 = 20;
/// Escape
pub const ESCAPE: u32 = 27;
/// Insert
pub const INSERT: u32 = 45;
/// Left command key
pub const META: u32 = 91;
/// Context-menu key
pub const CONTEXT_MENU: u32 = 93;

/// Check whether a key is a special/navigation key: modifiers, arrows,
/// function keys, paging and lock keys.
pub fn is_special_key(key: u32) -> bool {
    matches!(key, CAPS_LOCK | SHIFT | TAB | ESCAPE | CONTROL | META | PAUSE | ALT | CONTEXT_MENU | INSERT)
        || (35..=40).contains(&key) // Home, End, arrows
        || (33..=34).contains(&key) // Page Up, Page Down
        || (112..=123).contains(&key) // F1 - F12
        || (144..=145).contains(&key) // Num Lock, Scroll Lock
}
