//! Message vocabulary exchanged between contexts.
//!
//! ```text
//! page agent ──PageRegistered / PageUnregistered / BroadcastingChanged──▶ coordinator
//!            ──ShortcutChanged──────────────────────────────────────────▶
//! hotkey     ──TriggerPulse─────────────────────────────────────────────▶ coordinator
//! settings   ──SettingsOpened / SetMinPttLength─────────────────────────▶ coordinator
//!
//! coordinator ──TriggerPulse / ConfigChanged──▶ page agent
//! coordinator ──ConfigChanged─────────────────▶ settings observers
//! ```
//!
//! Requests that expect an answer carry a `oneshot` reply sender instead of
//! signalling "will reply later" through a return value.

use std::fmt;

use tokio::sync::{mpsc, oneshot};

use crate::shortcut::PttShortcut;

// ---------------------------------------------------------------------------
// PageHandle
// ---------------------------------------------------------------------------

/// Opaque identifier of a page, assigned by the page-lifecycle notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageHandle(u32);

impl PageHandle {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page#{}", self.0)
    }
}

/// Identifies one arming of a page's PTT window timer.
pub type TimerId = u64;

// ---------------------------------------------------------------------------
// Events delivered to a page agent
// ---------------------------------------------------------------------------

/// Everything a page agent's loop reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The global shortcut fired once.
    TriggerPulse,
    /// MinPttLength changed (milliseconds).
    ConfigChanged(u32),
    /// The page wrote `value` under `key` in its storage.
    StorageWrite { key: String, value: Option<String> },
    /// The PTT window timer armed with this id elapsed.
    WindowElapsed(TimerId),
    /// The page is going away; cancel everything and exit.
    Teardown,
}

/// Sending half of a page agent's inbox.
pub type PageOutbox = mpsc::UnboundedSender<PageEvent>;

// ---------------------------------------------------------------------------
// Events delivered to settings observers
// ---------------------------------------------------------------------------

/// Notices sent to settings surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    /// MinPttLength changed (milliseconds).
    ConfigChanged(u32),
}

// ---------------------------------------------------------------------------
// Requests to the coordinator
// ---------------------------------------------------------------------------

/// Requests handled by the coordinator loop.
#[derive(Debug)]
pub enum CoordinatorRequest {
    /// A page hosting the target app loaded.  Replies with MinPttLength.
    PageRegistered {
        handle: PageHandle,
        outbox: PageOutbox,
        reply: oneshot::Sender<u32>,
    },
    /// A page closed.
    PageUnregistered { handle: PageHandle },
    /// A page started or stopped broadcasting.
    BroadcastingChanged {
        handle: PageHandle,
        broadcasting: bool,
    },
    /// A page's PTT shortcut changed.  Informational.
    ShortcutChanged {
        handle: PageHandle,
        shortcut: PttShortcut,
    },
    /// Change MinPttLength (milliseconds).
    SetMinPttLength { value: u32 },
    /// A settings surface opened.  Replies with MinPttLength and subscribes
    /// `observer` to later changes.
    SettingsOpened {
        observer: mpsc::UnboundedSender<SettingsEvent>,
        reply: oneshot::Sender<u32>,
    },
    /// The global shortcut fired once.
    TriggerPulse,
    /// Stop the coordinator loop.
    Shutdown,
}
