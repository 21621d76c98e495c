//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout (config dir):
//!   Windows: %APPDATA%\ptt-bridge\
//!   macOS:   ~/Library/Application Support/ptt-bridge/
//!   Linux:   ~/.config/ptt-bridge/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding every file below.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Coordinator key-value store (`state.json`).
    pub state_file: PathBuf,
    /// Desktop page storage (`page-storage.json`).
    pub page_storage_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "ptt-bridge";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("settings.toml"),
            state_file: config_dir.join("state.json"),
            page_storage_file: config_dir.join("page-storage.json"),
            config_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
