//! Destination of synthetic key events.

use thiserror::Error;

use crate::shortcut::KeyEvent;

/// Whether a synthetic event presses or releases the shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Down,
    Up,
}

/// Errors raised while delivering a synthetic key event.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The input backend could not be initialised or refused the event.
    #[error("key backend failed: {0}")]
    Backend(String),

    /// The sink has no way to express this key code.
    #[error("key code {0} cannot be synthesised by this sink")]
    UnsupportedKey(u32),
}

/// Something that can receive synthetic key-down / key-up events for a page.
pub trait KeySink: Send {
    fn dispatch(&mut self, direction: KeyDirection, event: &KeyEvent) -> Result<(), DispatchError>;
}

impl<S: KeySink + ?Sized> KeySink for Box<S> {
    fn dispatch(&mut self, direction: KeyDirection, event: &KeyEvent) -> Result<(), DispatchError> {
        (**self).dispatch(direction, event)
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------
