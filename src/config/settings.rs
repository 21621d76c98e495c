//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//!
//! MinPttLength itself is *not* stored here: it is live state owned by the
//! coordinator and persisted in its key-value store.  The TOML file only
//! provides the default used before any value has been stored.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// MinPttLength used until the user changes it (milliseconds).
pub const DEFAULT_MIN_PTT_LENGTH_MS: u32 = 800;

/// Floor for rearming an active PTT window (milliseconds).
pub const DEFAULT_MIN_GAP_MS: u32 = 100;

// ---------------------------------------------------------------------------
// PttConfig
// ---------------------------------------------------------------------------

/// Timing of the synthetic PTT window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PttConfig {
    /// MinPttLength used when the coordinator's store has no value yet.
    pub default_min_ptt_length_ms: u32,
    /// Once trigger pulses repeat, the window never closes sooner than this
    /// after the latest pulse.
    pub min_gap_ms: u32,
}

impl Default for PttConfig {
    fn default() -> Self {
        Self {
            default_min_ptt_length_ms: DEFAULT_MIN_PTT_LENGTH_MS,
            min_gap_ms: DEFAULT_MIN_GAP_MS,
        }
    }
}

impl PttConfig {
    /// Replace timings the PTT window can't run with, logging each change.
    ///
    /// * `default_min_ptt_length_ms` must be positive.
    /// * `min_gap_ms` must be shorter than `default_min_ptt_length_ms`.
    pub fn sanitize(&mut self) {
        if self.default_min_ptt_length_ms == 0 {
            log::warn!(
                "config: ptt.default_min_ptt_length_ms must be positive, \
                 using {DEFAULT_MIN_PTT_LENGTH_MS}"
            );
            self.default_min_ptt_length_ms = DEFAULT_MIN_PTT_LENGTH_MS;
        }
        if self.min_gap_ms >= self.default_min_ptt_length_ms {
            let clamped = DEFAULT_MIN_GAP_MS.min(self.default_min_ptt_length_ms - 1);
            log::warn!(
                "config: ptt.min_gap_ms ({}) must be below \
                 ptt.default_min_ptt_length_ms ({}), using {clamped}",
                self.min_gap_ms,
                self.default_min_ptt_length_ms
            );
            self.min_gap_ms = clamped;
        }
    }
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global trigger key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Key name watched by the global listener (e.g. `"F9"`).
    pub trigger_key: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            trigger_key: "F9".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PageConfig
// ---------------------------------------------------------------------------

/// Settings for the desktop page (the focused window receiving key events).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// How often the page storage file is polled for writes.
    pub poll_interval_ms: u64,
    /// Shortcut written into an empty page storage on first run
    /// (e.g. `"Ctrl+Shift+KeyK"`).  `None` leaves PTT disabled until the
    /// storage file is edited.
    pub seed_shortcut: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            seed_shortcut: None,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Settings window behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Open the settings window on startup.  When `false` the bridge runs
    /// headless until Ctrl+C.
    pub show_settings_window: bool,
    /// Keep the settings window above all other windows.
    pub always_on_top: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_settings_window: true,
            always_on_top: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use ptt_bridge::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ptt: PttConfig,
    pub hotkey: HotkeyConfig,
    pub page: PageConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    ///
    /// PTT timings are passed through [`PttConfig::sanitize`].
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.ptt.sanitize();
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
