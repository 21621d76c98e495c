//! Deduplicating change detector for the PTT shortcut blob.
//!
//! The page rewrites its storage many times per second, almost always for
//! keys we do not care about or with an unchanged shortcut.  Downstream
//! windows reset their armed shortcut on every notification, so only genuine
//! changes are let through.

use super::parser::{parse_shortcut, MEDIA_ENGINE_KEY};
use super::PttShortcut;

/// Tracks the last shortcut seen in storage.
///
/// Starts out *unknown*, which differs from [`PttShortcut::Disabled`]: the
/// first observation is always reported, even when it is "disabled".
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<PttShortcut>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last shortcut reported, or `None` before the first observation.
    pub fn last_seen(&self) -> Option<&PttShortcut> {
        self.last.as_ref()
    }

    /// Parse `blob` and return the new shortcut if it differs from the last
    /// one reported.
    pub fn observe(&mut self, blob: Option<&str>) -> Option<PttShortcut> {
        let parsed = parse_shortcut(blob);
        if self.last.as_ref() == Some(&parsed) {
            return None;
        }
        log::debug!("shortcut: changed to {parsed}");
        self.last = Some(parsed.clone());
        Some(parsed)
    }

    /// Handle a storage write notification.  Writes to any key other than
    /// [`MEDIA_ENGINE_KEY`] are ignored without parsing.
    pub fn on_write(&mut self, key: &str, value: Option<&str>) -> Option<PttShortcut> {
        if key != MEDIA_ENGINE_KEY {
            return None;
        }
        self.observe(value)
    }
}
