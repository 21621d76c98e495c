//! Canonical shortcut representation.

use std::fmt;

use crate::keys::{self, Modifier, Modifiers, MODIFIER_CODES};

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// The fields a synthetic key-down / key-up event is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Legacy numeric key code of the primary key.
    pub key_code: u32,
    /// Modifier flags held with the primary key.
    pub modifiers: Modifiers,
}

// ---------------------------------------------------------------------------
// ShortcutSpec
// ---------------------------------------------------------------------------

/// A key combination as an ascending, duplicate-free list of key codes.
///
/// Equality is equality of the sorted code lists, so the order the codes
/// arrived in never matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortcutSpec {
    codes: Vec<u32>,
}

impl ShortcutSpec {
    /// Build a spec from codes in any order.  Duplicates are dropped.
    pub fn new(codes: impl IntoIterator<Item = u32>) -> Self {
        let mut codes: Vec<u32> = codes.into_iter().collect();
        codes.sort_unstable();
        codes.dedup();
        Self { codes }
    }

    /// Codes in ascending order.
    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Modifier flags for every modifier code present.
    pub fn modifiers(&self) -> Modifiers {
        let mut mods = Modifiers::default();
        for &code in &self.codes {
            if let Some(m) = Modifier::from_code(code) {
                mods.set(m);
            }
        }
        mods
    }

    /// The key the synthetic event is addressed to.
    ///
    /// This is the single non-modifier code, or the last modifier in
    /// [`MODIFIER_CODES`] order when the shortcut is made of modifiers only.
    /// Returns `None` when more than one non-modifier key is present, since a
    /// single event cannot carry two primary keys.
    pub fn primary_code(&self) -> Option<u32> {
        let mut plain = self.codes.iter().copied().filter(|&c| !keys::is_modifier(c));
        match (plain.next(), plain.next()) {
            (Some(code), None) => Some(code),
            (Some(_), Some(_)) => None,
            (None, _) => MODIFIER_CODES
                .iter()
                .rev()
                .map(|&(_, code)| code)
                .find(|code| self.codes.contains(code)),
        }
    }

    /// Event fields for dispatching this shortcut, if it is dispatchable.
    pub fn key_event(&self) -> Option<KeyEvent> {
        self.primary_code().map(|key_code| KeyEvent {
            key_code,
            modifiers: self.modifiers(),
        })
    }
}

impl fmt::Display for ShortcutSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for &code in &self.codes {
            if !first {
                f.write_str("+")?;
            }
            first = false;
            match keys::identifier_for(code) {
                Some(name) => f.write_str(name)?,
                None => write!(f, "#{code}")?,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PttShortcut
// ---------------------------------------------------------------------------

/// The page's push-to-talk shortcut: either disabled or a concrete spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PttShortcut {
    /// PTT mode is off, the blob is missing, or it could not be parsed.
    #[default]
    Disabled,
    Enabled(ShortcutSpec),
}

impl PttShortcut {
    /// Wrap `codes`; an empty list is [`PttShortcut::Disabled`].
    pub fn from_codes(codes: impl IntoIterator<Item = u32>) -> Self {
        let spec = ShortcutSpec::new(codes);
        if spec.is_empty() {
            PttShortcut::Disabled
        } else {
            PttShortcut::Enabled(spec)
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, PttShortcut::Enabled(_))
    }

    pub fn spec(&self) -> Option<&ShortcutSpec> {
        match self {
            PttShortcut::Enabled(spec) => Some(spec),
            PttShortcut::Disabled => None,
        }
    }
}

impl fmt::Display for PttShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PttShortcut::Disabled => f.write_str("<disabled>"),
            PttShortcut::Enabled(spec) => fmt::Display::fmt(spec, f),
        }
    }
}
