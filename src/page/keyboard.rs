//! [`KeySink`] that types the shortcut into the focused window via `enigo`.
//!
//! Key-down presses the held modifiers first and the primary key last;
//! key-up releases in the opposite order.
//!
//! | Code range | enigo key |
//! |------------|-----------|
//! | 48–57, 65–90 | `Key::Unicode` (digit / lowercase letter) |
//! | 112–131 | `Key::F1` – `Key::F20` |
//! | 16, 17, 18, 91 | `Shift`, `Control`, `Alt`, `Meta` |
//! | named codes | `Space`, `Return`, arrows, … |
//! | anything else | `Key::Other` (Windows only) |

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use crate::keys::Modifier;
use crate::ptt::{DispatchError, KeyDirection, KeySink};
use crate::shortcut::KeyEvent;

/// Sends synthetic key events to whatever window has keyboard focus.
///
/// A new [`Enigo`] is created for each dispatch because `Enigo` is not
/// `Send` and the handle is cheap to construct.
#[derive(Debug, Default)]
pub struct KeyboardSink;

impl KeyboardSink {
    pub fn new() -> Self {
        Self
    }
}

impl KeySink for KeyboardSink {
    fn dispatch(&mut self, direction: KeyDirection, event: &KeyEvent) -> Result<(), DispatchError> {
        let keys = key_sequence(event)?;
        let mut enigo =
            Enigo::new(&Settings::default()).map_err(|e| DispatchError::Backend(e.to_string()))?;

        match direction {
            KeyDirection::Down => {
                for key in keys {
                    enigo
                        .key(key, Direction::Press)
                        .map_err(|e| DispatchError::Backend(e.to_string()))?;
                }
            }
            KeyDirection::Up => {
                for key in keys.into_iter().rev() {
                    enigo
                        .key(key, Direction::Release)
                        .map_err(|e| DispatchError::Backend(e.to_string()))?;
                }
            }
        }
        log::trace!("keyboard: {direction:?} key {}", event.key_code);
        Ok(())
    }
}

/// Modifiers in canonical order, then the primary key.  A primary that is
/// itself a held modifier is pressed only once.
fn key_sequence(event: &KeyEvent) -> Result<Vec<Key>, DispatchError> {
    let primary_modifier = Modifier::from_code(event.key_code);
    let mut keys: Vec<Key> = event
        .modifiers
        .pressed()
        .filter(|&m| Some(m) != primary_modifier)
        .map(modifier_key)
        .collect();
    keys.push(enigo_key(event.key_code)?);
    Ok(keys)
}

fn modifier_key(modifier: Modifier) -> Key {
    match modifier {
        Modifier::Shift => Key::Shift,
        Modifier::Ctrl => Key::Control,
        Modifier::Alt => Key::Alt,
        Modifier::Meta => Key::Meta,
    }
}

/// Map a canonical key code to an enigo key.
fn enigo_key(code: u32) -> Result<Key, DispatchError> {
    if let Some(modifier) = Modifier::from_code(code) {
        return Ok(modifier_key(modifier));
    }

    let key = match code {
        48..=57 | 65..=90 => {
            let c = char::from_u32(code)
                .map(|c| c.to_ascii_lowercase())
                .ok_or(DispatchError::UnsupportedKey(code))?;
            Key::Unicode(c)
        }
        8 => Key::Backspace,
        9 => Key::Tab,
        13 => Key::Return,
        20 => Key::CapsLock,
        27 => Key::Escape,
        32 => Key::Space,
        33 => Key::PageUp,
        34 => Key::PageDown,
        35 => Key::End,
        36 => Key::Home,
        37 => Key::LeftArrow,
        38 => Key::UpArrow,
        39 => Key::RightArrow,
        40 => Key::DownArrow,
        46 => Key::Delete,
        112..=131 => function_key(code - 111).ok_or(DispatchError::UnsupportedKey(code))?,
        _ => return other_key(code),
    };
    Ok(key)
}

fn function_key(n: u32) -> Option<Key> {
    Some(match n {
        1 => Key::F1,
        2 => Key::F2,
        3 => Key::F3,
        4 => Key::F4,
        5 => Key::F5,
        6 => Key::F6,
        7 => Key::F7,
        8 => Key::F8,
        9 => Key::F9,
        10 => Key::F10,
        11 => Key::F11,
        12 => Key::F12,
        13 => Key::F13,
        14 => Key::F14,
        15 => Key::F15,
        16 => Key::F16,
        17 => Key::F17,
        18 => Key::F18,
        19 => Key::F19,
        20 => Key::F20,
        _ => return None,
    })
}

/// Canonical codes are Windows virtual-key codes, so they only pass through
/// raw on Windows.
#[cfg(target_os = "windows")]
fn other_key(code: u32) -> Result<Key, DispatchError> {
    Ok(Key::Other(code))
}

#[cfg(not(target_os = "windows"))]
fn other_key(code: u32) -> Result<Key, DispatchError> {
    Err(DispatchError::UnsupportedKey(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::ShortcutSpec;

    fn event(codes: &[u32]) -> KeyEvent {
        ShortcutSpec::new(codes.iter().copied())
            .key_event()
            .expect("dispatchable")
    }

    #[test]
    fn letters_and_digits_are_unicode() {
        assert_eq!(enigo_key(75).unwrap(), Key::Unicode('k'));
        assert_eq!(enigo_key(48).unwrap(), Key::Unicode('0'));
    }

    #[test]
    fn function_and_named_keys() {
        assert_eq!(enigo_key(112).unwrap(), Key::F1);
        assert_eq!(enigo_key(131).unwrap(), Key::F20);
        assert_eq!(enigo_key(32).unwrap(), Key::Space);
        assert_eq!(enigo_key(38).unwrap(), Key::UpArrow);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn unmapped_code_is_unsupported() {
        assert!(matches!(enigo_key(186), Err(DispatchError::UnsupportedKey(186))));
    }

    #[test]
    fn modifiers_precede_primary() {
        // Ctrl+Shift+K
        assert_eq!(
            key_sequence(&event(&[16, 17, 75])).unwrap(),
            vec![Key::Shift, Key::Control, Key::Unicode('k')]
        );
    }

    #[test]
    fn modifier_primary_is_pressed_once() {
        // Ctrl+Shift: primary is Ctrl, which is also a held modifier.
        assert_eq!(
            key_sequence(&event(&[16, 17])).unwrap(),
            vec![Key::Shift, Key::Control]
        );
    }
}
