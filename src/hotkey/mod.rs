//! Global trigger shortcut, backed by `rdev`.
//!
//! `rdev::listen()` is a blocking OS-level call that never returns while the
//! process is alive, so [`HotkeyListener::start`] runs it on a dedicated OS
//! thread.  Every key-press of the configured key becomes one trigger pulse
//! sent to the coordinator; OS auto-repeat while the key is held produces the
//! stream of pulses the PTT window absorbs.  Releases are not forwarded.
//!
//! ```no_run
//! use ptt_bridge::channel::CoordinatorHandle;
//! use ptt_bridge::hotkey::{parse_key, HotkeyListener};
//!
//! let (coordinator, _inbox) = CoordinatorHandle::channel();
//! let key = parse_key("F9").expect("unknown key");
//! let _listener = HotkeyListener::start(key, coordinator).expect("listener thread");
//! ```

pub mod listener;

pub use listener::HotkeyListener;

/// Parse a hotkey name from a config string into an [`rdev::Key`].
///
/// Supports F1–F12, common named keys, and single uppercase or lowercase ASCII
/// letters.  Returns `None` for unrecognised names.
///
/// ```
/// use ptt_bridge::hotkey::parse_key;
///
/// assert_eq!(parse_key("F9"),      Some(rdev::Key::F9));
/// assert_eq!(parse_key("Escape"),  Some(rdev::Key::Escape));
/// assert_eq!(parse_key("a"),       Some(rdev::Key::KeyA));
/// assert_eq!(parse_key("xyz"),     None);
/// ```
pub fn parse_key(key_str: &str) -> Option<rdev::Key> {
    use rdev::Key;

    let key = match key_str {
        "F1" => Key::F1,
        "F2" => Key::F2,
        "F3" => Key::F3,
        "F4" => Key::F4,
        "F5" => Key::F5,
        "F6" => Key::F6,
        "F7" => Key::F7,
        "F8" => Key::F8,
        "F9" => Key::F9,
        "F10" => Key::F10,
        "F11" => Key::F11,
        "F12" => Key::F12,

        "Escape" | "Esc" => Key::Escape,
        "Space" => Key::Space,
        "Return" | "Enter" => Key::Return,
        "Tab" => Key::Tab,
        "Backspace" => Key::Backspace,
        "Delete" | "Del" => Key::Delete,
        "Insert" => Key::Insert,
        "Home" => Key::Home,
        "End" => Key::End,
        "PageUp" => Key::PageUp,
        "PageDown" => Key::PageDown,
        "UpArrow" | "Up" => Key::UpArrow,
        "DownArrow" | "Down" => Key::DownArrow,
        "LeftArrow" | "Left" => Key::LeftArrow,
        "RightArrow" | "Right" => Key::RightArrow,

        "CapsLock" => Key::CapsLock,
        "NumLock" => Key::NumLock,
        "ScrollLock" => Key::ScrollLock,
        "PrintScreen" => Key::PrintScreen,
        "Pause" => Key::Pause,

        // Single letters, case-insensitive.
        s if s.len() == 1 => return letter_key(s.as_bytes()[0].to_ascii_uppercase()),

        _ => return None,
    };
    Some(key)
}

fn letter_key(letter: u8) -> Option<rdev::Key> {
    use rdev::Key;

    Some(match letter {
        b'A' => Key::KeyA,
        b'B' => Key::KeyB,
        b'C' => Key::KeyC,
        b'D' => Key::KeyD,
        b'E' => Key::KeyE,
        b'F' => Key::KeyF,
        b'G' => Key::KeyG,
        b'H' => Key::KeyH,
        b'I' => Key::KeyI,
        b'J' => Key::KeyJ,
        b'K' => Key::KeyK,
        b'L' => Key::KeyL,
        b'M' => Key::KeyM,
        b'N' => Key::KeyN,
        b'O' => Key::KeyO,
        b'P' => Key::KeyP,
        b'Q' => Key::KeyQ,
        b'R' => Key::KeyR,
        b'S' => Key::KeyS,
        b'T' => Key::KeyT,
        b'U' => Key::KeyU,
        b'V' => Key::KeyV,
        b'W' => Key::KeyW,
        b'X' => Key::KeyX,
        b'Y' => Key::KeyY,
        b'Z' => Key::KeyZ,
        _ => return None,
    })
}
