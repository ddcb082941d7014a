//! Controller settings.
//!
//! Read once when a session is created; a running session never re-reads
//! them. Stored as JSON under the user's config directory.

use crate::constants::DEFAULT_SCROLL_STEP_PX;
use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory name under the platform config dir
const APP_DIR: &str = "autoscroll";

/// File name of the settings file
const SETTINGS_FILE: &str = "settings.json";

/// Path of the settings file, if the platform has a config directory
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pixels scrolled per tick
    pub scroll_step_pixels: f64,
    /// Start scrolling automatically when a page is entered
    pub auto_start_on_entry: bool,
    /// Show notifications at all
    pub enable_notifications: bool,
    /// After reaching the bottom, offer to restart from the top
    pub offer_restart_from_top: bool,
    /// Fixed seed for tick jitter; random when absent
    pub jitter_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scroll_step_pixels: DEFAULT_SCROLL_STEP_PX,
            auto_start_on_entry: false,
            enable_notifications: true,
            offer_restart_from_top: true,
            jitter_seed: None,
        }
    }
}

impl Settings {
    /// Load from the default path, falling back to defaults on any problem.
    pub fn load() -> Self {
        match default_settings_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                debug!("no config directory, using default settings");
                Self::default()
            }
        }
    }

    /// Load from `path`; a missing file yields defaults, a broken one yields
    /// defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings file not found, using defaults");
                Self::default()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    /// Strict load: IO, JSON and validation errors are returned.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write pretty JSON through a temp file in the same directory.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        let json = serde_json::to_string_pretty(self)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.scroll_step_pixels.is_finite() || self.scroll_step_pixels <= 0.0 {
            return Err(SettingsError::Invalid {
                field: "scroll_step_pixels",
                reason: format!("must be a positive number, got {}", self.scroll_step_pixels),
            });
        }
        Ok(())
    }
}
