//! Runtime configuration.
//!
//! Settings are read once at startup from `settings.json` in the platform
//! config directory and treated as read-only for the rest of the session.
//! A missing or corrupt file never aborts startup: loading falls back to
//! defaults field by field, so a partial file behaves like a full one.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// User-facing settings consumed by the shell core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Keep the main window hidden after startup.
    pub start_minimized: bool,
    /// Convert window close into hide, keeping the process alive in the tray.
    pub minimize_to_tray: bool,
    /// Whether content should render the custom title bar. Resolved once at
    /// webview creation and exposed to content as `titlebar.isTitlebar`.
    pub custom_titlebar: bool,
    /// The trusted origin loaded after the splash phase.
    pub discord_url: String,
    /// Glob patterns (`*` wildcard) for permitted network destinations.
    pub whitelist: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_minimized: false,
            minimize_to_tray: true,
            custom_titlebar: true,
            discord_url: "https://discord.com/app".to_string(),
            whitelist: vec![
                "https://discord.com/*".to_string(),
                "https://*.discord.com/*".to_string(),
                "https://*.discordapp.com/*".to_string(),
                "https://*.discordapp.net/*".to_string(),
                "wss://*.discord.gg/*".to_string(),
                "wss://*.discord.media/*".to_string(),
                "https://*.hcaptcha.com/*".to_string(),
                "https://www.gstatic.com/*".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load settings from the default location. Never panics; any failure
    /// is logged and answered with defaults.
    pub fn load() -> Self {
        Self::load_from(&settings_path())
    }

    /// Load settings from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Config>(&content) {
                Ok(config) => {
                    log::info!("Loaded settings from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid settings file {}: {}; using defaults", path.display(), e);
                    Config::default()
                }
            },
            Err(_) => {
                log::info!("No settings file at {}; using defaults", path.display());
                Config::default()
            }
        }
    }
}

/// Root directory for Ferricord's persisted files.
pub fn config_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ferricord")
}

/// Path of the settings file.
pub fn settings_path() -> PathBuf {
    config_root().join("settings.json")
}

/// Path of the persisted window geometry record.
pub fn window_state_path() -> PathBuf {
    config_root().join("window-state.json")
}

/// Directory scanned by the plugin loader.
pub fn plugins_dir() -> PathBuf {
    config_root().join("plugins")
}
