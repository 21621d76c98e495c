//! PTT shortcut model, blob parsing and change detection.
//!
//! * [`ShortcutSpec`] / [`PttShortcut`]: canonical shortcut values.
//! * [`parse_shortcut`] / [`parse_broadcasting`]: fail-soft blob parsers.
//! * [`ChangeDetector`]: forwards only genuine shortcut changes.
//! * [`parse_combo`]: `"Ctrl+Shift+KeyK"` style strings from config.

pub mod combo;
pub mod detector;
pub mod parser;
pub mod spec;

pub use combo::parse_combo;
pub use detector::ChangeDetector;
pub use parser::{
    encode_shortcut, parse_broadcasting, parse_shortcut, try_parse_broadcasting,
    try_parse_shortcut, MEDIA_ENGINE_KEY, SELECTED_CHANNEL_KEY,
};
pub use spec::{KeyEvent, PttShortcut, ShortcutSpec};

use thiserror::Error;

// ---------------------------------------------------------------------------
// ShortcutError
// ---------------------------------------------------------------------------

/// Reasons a blob or combo string could not be turned into a shortcut.
///
/// These never escape the fail-soft entry points; they are logged and mapped
/// to "disabled".
#[derive(Debug, Error)]
pub enum ShortcutError {
    /// The blob is not JSON of the expected shape.
    #[error("malformed blob: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Push-to-talk mode without a `modeOptions.shortcut` list.
    #[error("push-to-talk mode has no shortcut list")]
    MissingShortcut,

    /// A shortcut entry is not `[keyboard, code, browser]`.
    #[error("unrecognised shortcut specification at index {index}: {entry:?}")]
    UnrecognisedEntry { index: usize, entry: Vec<i64> },

    /// A key code that does not fit the code space.
    #[error("key code {0} out of range")]
    CodeOutOfRange(i64),

    /// A combo token missing from the key code table.
    #[error("unknown key identifier: {0}")]
    UnknownKey(String),

    /// A combo naming more than one non-modifier key.
    #[error("more than one non-modifier key in {0:?}")]
    MultipleKeys(String),

    /// A combo with no keys at all.
    #[error("empty shortcut")]
    EmptyCombo,
}
