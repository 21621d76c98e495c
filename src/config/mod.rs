//! Configuration module for the PTT bridge.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, HotkeyConfig, PageConfig, PttConfig, UiConfig, DEFAULT_MIN_GAP_MS,
    DEFAULT_MIN_PTT_LENGTH_MS,
};
