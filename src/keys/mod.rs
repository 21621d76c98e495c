//! Key code normalisation.
//!
//! * [`code_for`] maps a symbolic key identifier onto its canonical code.
//! * [`decompose_modifiers`] turns a primary code plus modifier flags into the
//!   canonical, ascending code list that every shortcut comparison uses.

pub mod codes;

pub use codes::{code_for, identifier_for, ALT, CTRL, META, SHIFT};

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier flags carried by a synthetic key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// One of the four modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Shift,
    Ctrl,
    Alt,
    Meta,
}

/// Modifiers in decomposition order, with their codes.
///
/// The order matters: when a shortcut consists only of modifiers, the last
/// one found in this order becomes the primary code.
pub const MODIFIER_CODES: [(Modifier, u32); 4] = [
    (Modifier::Shift, SHIFT),
    (Modifier::Ctrl, CTRL),
    (Modifier::Alt, ALT),
    (Modifier::Meta, META),
];

impl Modifier {
    /// Canonical code of this modifier.
    pub fn code(self) -> u32 {
        match self {
            Modifier::Shift => SHIFT,
            Modifier::Ctrl => CTRL,
            Modifier::Alt => ALT,
            Modifier::Meta => META,
        }
    }

    /// The modifier whose code is `code`, if any.
    pub fn from_code(code: u32) -> Option<Self> {
        MODIFIER_CODES
            .iter()
            .find(|&&(_, c)| c == code)
            .map(|&(m, _)| m)
    }
}

impl Modifiers {
    pub fn is_set(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Shift => self.shift,
            Modifier::Ctrl => self.ctrl,
            Modifier::Alt => self.alt,
            Modifier::Meta => self.meta,
        }
    }

    pub fn set(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Shift => self.shift = true,
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Alt => self.alt = true,
            Modifier::Meta => self.meta = true,
        }
    }

    /// Pressed modifiers in [`MODIFIER_CODES`] order.
    pub fn pressed(&self) -> impl Iterator<Item = Modifier> + '_ {
        MODIFIER_CODES
            .iter()
            .map(|&(m, _)| m)
            .filter(move |m| self.is_set(*m))
    }

    pub fn is_empty(&self) -> bool {
        self.pressed().next().is_none()
    }
}

/// Returns `true` for the four canonical modifier codes.
pub fn is_modifier(code: u32) -> bool {
    Modifier::from_code(code).is_some()
}

// ---------------------------------------------------------------------------
// decompose_modifiers
// ---------------------------------------------------------------------------

/// Build the canonical code list for `primary` held together with `modifiers`.
///
/// The list contains `primary` plus the code of each pressed modifier, without
/// repeating `primary` when it is itself one of the pressed modifiers, sorted
/// ascending.
///
/// ```
/// use ptt_bridge::keys::{decompose_modifiers, Modifiers};
///
/// let mods = Modifiers { ctrl: true, shift: true, ..Modifiers::default() };
/// assert_eq!(decompose_modifiers(75, mods), vec![16, 17, 75]);
/// assert_eq!(decompose_modifiers(16, mods), vec![16, 17]);
/// ```
pub fn decompose_modifiers(primary: u32, modifiers: Modifiers) -> Vec<u32> {
    let mut codes = vec![primary];
    codes.extend(
        modifiers
            .pressed()
            .map(Modifier::code)
            .filter(|&code| code != primary),
    );
    codes.sort_unstable();
    codes
}
