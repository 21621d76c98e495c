//! Human-readable shortcut strings such as `"Ctrl+Shift+KeyK"`.
//!
//! Tokens are separated by `+`.  Modifier tokens accept the usual names
//! (`Ctrl`, `Control`, `Shift`, `Alt`, `Option`, `Meta`, `Cmd`, `Super`,
//! `Win`) as well as their key identifiers (`ShiftLeft`, …).  At most one
//! non-modifier key is allowed; every other token goes through
//! [`code_for`](crate::keys::code_for).

use crate::keys::{self, decompose_modifiers, Modifier, Modifiers, MODIFIER_CODES};

use super::{ShortcutError, ShortcutSpec};

fn modifier_named(token: &str) -> Option<Modifier> {
    match token.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Some(Modifier::Ctrl),
        "shift" => Some(Modifier::Shift),
        "alt" | "option" => Some(Modifier::Alt),
        "meta" | "cmd" | "command" | "super" | "win" => Some(Modifier::Meta),
        _ => None,
    }
}

/// Parse a combo string into a canonical [`ShortcutSpec`].
///
/// ```
/// use ptt_bridge::shortcut::parse_combo;
///
/// let spec = parse_combo("Ctrl+Shift+KeyK").unwrap();
/// assert_eq!(spec.codes(), &[16, 17, 75]);
/// ```
pub fn parse_combo(combo: &str) -> Result<ShortcutSpec, ShortcutError> {
    let mut modifiers = Modifiers::default();
    let mut primary: Option<u32> = None;

    for token in combo.split('+').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(m) = modifier_named(token) {
            modifiers.set(m);
            continue;
        }

        let Some(code) = keys::code_for(token) else {
            log::warn!("shortcut: unknown key identifier {token:?} in {combo:?}");
            return Err(ShortcutError::UnknownKey(token.to_string()));
        };

        if let Some(m) = Modifier::from_code(code) {
            modifiers.set(m);
        } else if primary.replace(code).is_some() {
            return Err(ShortcutError::MultipleKeys(combo.to_string()));
        }
    }

    // A bare modifier combo is addressed to the last modifier in table order.
    let primary = match primary {
        Some(code) => code,
        None => MODIFIER_CODES
            .iter()
            .rev()
            .find(|&&(m, _)| modifiers.is_set(m))
            .map(|&(_, code)| code)
            .ok_or(ShortcutError::EmptyCombo)?,
    };

    Ok(ShortcutSpec::new(decompose_modifiers(primary, modifiers)))
}
