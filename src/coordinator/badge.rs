//! On/off status indicator derived from the broadcast state.

use tokio::sync::watch;

use crate::channel::PageHandle;

/// What the status badge shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeState {
    On,
    #[default]
    Off,
}

impl BadgeState {
    /// "On" iff some page is broadcasting.
    pub fn from_broadcaster(broadcaster: Option<PageHandle>) -> Self {
        if broadcaster.is_some() {
            BadgeState::On
        } else {
            BadgeState::Off
        }
    }

    /// Badge text: `"ON"` or empty.
    pub fn text(self) -> &'static str {
        match self {
            BadgeState::On => "ON",
            BadgeState::Off => "",
        }
    }
}

/// Publishes the badge to any number of subscribers.
///
/// Holds no state of its own beyond the last projected value; the registry
/// calls [`project`](Self::project) whenever the broadcaster changes.
#[derive(Debug)]
pub struct BadgeProjector {
    tx: watch::Sender<BadgeState>,
}

impl BadgeProjector {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(BadgeState::Off);
        Self { tx }
    }

    pub fn current(&self) -> BadgeState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BadgeState> {
        self.tx.subscribe()
    }

    /// Recompute the badge from `broadcaster`; subscribers are only woken
    /// when the value actually changes.
    pub fn project(&self, broadcaster: Option<PageHandle>) {
        let next = BadgeState::from_broadcaster(broadcaster);
        let changed = self.tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        if changed {
            log::info!("badge: {:?}", next);
        }
    }
}

impl Default for BadgeProjector {
    fn default() -> Self {
        Self::new()
    }
}
