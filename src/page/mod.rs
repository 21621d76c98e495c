//! Page-side contexts.
//!
//! * [`PageAgent`]: per-page loop owning the PTT window.
//! * [`PageObserver`]: storage writes → shortcut / broadcasting notices.
//! * [`PageStorage`]: `localStorage`-like storage with write subscriptions,
//!   in memory ([`MemoryPageStorage`]) or on disk ([`FilePageStorage`]).
//! * [`KeyboardSink`]: delivers synthetic keys to the focused window.

pub mod agent;
pub mod file_storage;
pub mod keyboard;
pub mod observer;
pub mod storage;

pub use agent::PageAgent;
pub use file_storage::{seed_shortcut, FilePageStorage};
pub use keyboard::KeyboardSink;
pub use observer::{ObserverEvent, PageObserver};
pub use storage::{MemoryPageStorage, PageStorage, StorageCallback, SubscriptionId};
