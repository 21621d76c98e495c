//! In-page observer: turns storage writes into shortcut and broadcast notices.

use crate::shortcut::{
    parse_broadcasting, ChangeDetector, PttShortcut, MEDIA_ENGINE_KEY, SELECTED_CHANNEL_KEY,
};

use super::storage::PageStorage;

/// What the observer reports to its page agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    ShortcutChanged(PttShortcut),
    BroadcastingChanged(bool),
}

/// A page broadcasts while its PTT shortcut is enabled and it is connected
/// to a voice channel.  Both notices are only emitted on change.
#[derive(Debug, Default)]
pub struct PageObserver {
    detector: ChangeDetector,
    connected: bool,
    broadcasting: Option<bool>,
}

impl PageObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broadcasting(&self) -> bool {
        self.broadcasting.unwrap_or(false)
    }

    /// Read the current values from `storage` and report them.  The first
    /// call always yields one shortcut and one broadcasting notice.
    pub fn start(&mut self, storage: &dyn PageStorage) -> Vec<ObserverEvent> {
        self.connected = parse_broadcasting(storage.get_item(SELECTED_CHANNEL_KEY).as_deref());

        let mut events = Vec::new();
        let blob = storage.get_item(MEDIA_ENGINE_KEY);
        if let Some(shortcut) = self.detector.observe(blob.as_deref()) {
            events.push(ObserverEvent::ShortcutChanged(shortcut));
        }
        self.push_broadcasting(&mut events);
        events
    }

    /// Handle one storage write.
    pub fn on_write(&mut self, key: &str, value: Option<&str>) -> Vec<ObserverEvent> {
        let mut events = Vec::new();
        match key {
            MEDIA_ENGINE_KEY => {
                if let Some(shortcut) = self.detector.on_write(key, value) {
                    events.push(ObserverEvent::ShortcutChanged(shortcut));
                }
            }
            SELECTED_CHANNEL_KEY => self.connected = parse_broadcasting(value),
            _ => return events,
        }
        self.push_broadcasting(&mut events);
        events
    }

    fn push_broadcasting(&mut self, events: &mut Vec<ObserverEvent>) {
        let enabled = self.detector.last_seen().is_some_and(PttShortcut::is_enabled);
        let now = enabled && self.connected;
        if self.broadcasting != Some(now) {
            self.broadcasting = Some(now);
            events.push(ObserverEvent::BroadcastingChanged(now));
        }
    }
}
