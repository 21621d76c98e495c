//! Push-to-talk forwarding bridge.
//!
//! Forwards a global trigger shortcut into correctly paired synthetic
//! push-to-talk key presses inside a target page, while a coordinator keeps
//! track of live pages, the broadcasting page and the minimum PTT length.
//!
//! Leaf-first:
//!
//! * [`keys`]: key code table and modifier decomposition.
//! * [`shortcut`]: shortcut blob parsing and change detection.
//! * [`ptt`]: the per-page PTT window state machine.
//! * [`channel`]: messages and handles between contexts.
//! * [`store`]: persistent key-value store.
//! * [`coordinator`]: page/broadcast registry and badge.
//! * [`page`]: page agent, observer, page storage and keyboard sink.
//! * [`hotkey`]: OS-global trigger shortcut.
//! * [`config`]: TOML settings and paths.
//! * [`app`]: the egui settings window.

pub mod app;
pub mod channel;
pub mod config;
pub mod coordinator;
pub mod hotkey;
pub mod keys;
pub mod page;
pub mod ptt;
pub mod shortcut;
pub mod store;
