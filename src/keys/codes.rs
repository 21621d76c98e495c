//! Static key identifier → numeric key code table.
//!
//! Identifiers are W3C `KeyboardEvent.code` names (`"KeyA"`, `"ShiftLeft"`,
//! `"Numpad7"` …) with a handful of short aliases.  Codes are the legacy
//! `keyCode` values the target page compares against.
//!
//! Left and right variants of a modifier collapse onto one code, so
//! `"ShiftLeft"` and `"ShiftRight"` are indistinguishable once mapped.

/// Shift (both sides).
pub const SHIFT: u32 = 16;
/// Control (both sides).
pub const CTRL: u32 = 17;
/// Alt / Option (both sides).
pub const ALT: u32 = 18;
/// Meta / Command / Windows (both sides).
pub const META: u32 = 91;

/// `(identifier, code)` pairs.  Lookups are case-sensitive.
pub const KEY_CODES: &[(&str, u32)] = &[
    // Modifiers
    ("ShiftLeft", SHIFT),
    ("ShiftRight", SHIFT),
    ("ControlLeft", CTRL),
    ("ControlRight", CTRL),
    ("AltLeft", ALT),
    ("AltRight", ALT),
    ("MetaLeft", META),
    ("MetaRight", META),
    ("OSLeft", META),
    ("OSRight", META),
    // Editing / whitespace
    ("Backspace", 8),
    ("Tab", 9),
    ("Enter", 13),
    ("NumpadEnter", 13),
    ("Pause", 19),
    ("CapsLock", 20),
    ("Escape", 27),
    ("Space", 32),
    // Navigation
    ("PageUp", 33),
    ("PageDown", 34),
    ("End", 35),
    ("Home", 36),
    ("ArrowLeft", 37),
    ("ArrowUp", 38),
    ("ArrowRight", 39),
    ("ArrowDown", 40),
    ("PrintScreen", 44),
    ("Insert", 45),
    ("Delete", 46),
    // Digits
    ("Digit0", 48),
    ("Digit1", 49),
    ("Digit2", 50),
    ("Digit3", 51),
    ("Digit4", 52),
    ("Digit5", 53),
    ("Digit6", 54),
    ("Digit7", 55),
    ("Digit8", 56),
    ("Digit9", 57),
    // Letters
    ("KeyA", 65),
    ("KeyB", 66),
    ("KeyC", 67),
    ("KeyD", 68),
    ("KeyE", 69),
    ("KeyF", 70),
    ("KeyG", 71),
    ("KeyH", 72),
    ("KeyI", 73),
    ("KeyJ", 74),
    ("KeyK", 75),
    ("KeyL", 76),
    ("KeyM", 77),
    ("KeyN", 78),
    ("KeyO", 79),
    ("KeyP", 80),
    ("KeyQ", 81),
    ("KeyR", 82),
    ("KeyS", 83),
    ("KeyT", 84),
    ("KeyU", 85),
    ("KeyV", 86),
    ("KeyW", 87),
    ("KeyX", 88),
    ("KeyY", 89),
    ("KeyZ", 90),
    ("ContextMenu", 93),
    // Numpad
    ("Numpad0", 96),
    ("Numpad1", 97),
    ("Numpad2", 98),
    ("Numpad3", 99),
    ("Numpad4", 100),
    ("Numpad5", 101),
    ("Numpad6", 102),
    ("Numpad7", 103),
    ("Numpad8", 104),
    ("Numpad9", 105),
    ("NumpadMultiply", 106),
    ("NumpadAdd", 107),
    ("NumpadSubtract", 109),
    ("NumpadDecimal", 110),
    ("NumpadDivide", 111),
    // Function keys
    ("F1", 112),
    ("F2", 113),
    ("F3", 114),
    ("F4", 115),
    ("F5", 116),
    ("F6", 117),
    ("F7", 118),
    ("F8", 119),
    ("F9", 120),
    ("F10", 121),
    ("F11", 122),
    ("F12", 123),
    ("F13", 124),
    ("F14", 125),
    ("F15", 126),
    ("F16", 127),
    ("F17", 128),
    ("F18", 129),
    ("F19", 130),
    ("F20", 131),
    ("F21", 132),
    ("F22", 133),
    ("F23", 134),
    ("F24", 135),
    // Locks
    ("NumLock", 144),
    ("ScrollLock", 145),
    // Punctuation (US layout)
    ("Semicolon", 186),
    ("Equal", 187),
    ("Comma", 188),
    ("Minus", 189),
    ("Period", 190),
    ("Slash", 191),
    ("Backquote", 192),
    ("BracketLeft", 219),
    ("Backslash", 220),
    ("BracketRight", 221),
    ("Quote", 222),
    ("IntlBackslash", 226),
    // Aliases
    ("Esc", 27),
    ("Return", 13),
    ("Del", 46),
    ("Up", 38),
    ("Down", 40),
    ("Left", 37),
    ("Right", 39),
];

/// Look up the canonical code for `identifier`.
///
/// Returns `None` for identifiers missing from [`KEY_CODES`]; callers log and
/// drop the event rather than failing.
pub fn code_for(identifier: &str) -> Option<u32> {
    KEY_CODES
        .iter()
        .find(|(name, _)| *name == identifier)
        .map(|&(_, code)| code)
}

/// Reverse lookup: the first identifier registered for `code`.
///
/// Used for log output only.  Modifier codes resolve to their left variant.
pub fn identifier_for(code: u32) -> Option<&'static str> {
    KEY_CODES
        .iter()
        .find(|&&(_, c)| c == code)
        .map(|&(name, _)| name)
}
