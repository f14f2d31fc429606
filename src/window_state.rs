//! Persisted window geometry.
//!
//! The record `{width, height, x, y, isMaximized}` is written on every
//! close/hide and read once at the next startup to restore the main
//! window. A write failure is logged and the session keeps its in-memory
//! geometry; it never blocks closing or hiding the window.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tauri::{Runtime, Window};

use crate::error::FerricordResult;

/// Snapshot of the main window's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowState {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub is_maximized: bool,
}

impl Default for WindowState {
    fn default() -> Self {
        // First run: small frame that is immediately maximized, matching the
        // splash window dimensions.
        Self {
            width: 300,
            height: 350,
            x: 0,
            y: 0,
            is_maximized: true,
        }
    }
}

impl WindowState {
    /// Read the persisted state, or defaults when the file is missing or
    /// unreadable. Never panics.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(state) => state,
                Err(e) => {
                    log::warn!(
                        "Invalid window state file {}: {}; using defaults",
                        path.display(),
                        e
                    );
                    WindowState::default()
                }
            },
            Err(_) => WindowState::default(),
        }
    }

    /// Persist the state, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> FerricordResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Capture the current geometry of a live window.
    pub fn from_window<R: Runtime>(window: &Window<R>) -> FerricordResult<Self> {
        let size = window.inner_size()?;
        let position = window.outer_position()?;
        Ok(Self {
            width: size.width,
            height: size.height,
            x: position.x,
            y: position.y,
            is_maximized: window.is_maximized()?,
        })
    }

    /// Same snapshot taken through a webview window handle.
    pub fn from_webview_window<R: Runtime>(
        window: &tauri::WebviewWindow<R>,
    ) -> FerricordResult<Self> {
        let size = window.inner_size()?;
        let position = window.outer_position()?;
        Ok(Self {
            width: size.width,
            height: size.height,
            x: position.x,
            y: position.y,
            is_maximized: window.is_maximized()?,
        })
    }

    /// Persist to the default location, logging instead of failing; the
    /// session carries on with in-memory geometry.
    pub fn persist(&self) {
        if let Err(e) = self.save(&crate::config::window_state_path()) {
            log::error!("Failed to persist window state: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "ferricord-test-{}-{}.json",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_defaults_on_first_run() {
        let state = WindowState::load(Path::new("/definitely/not/a/real/path.json"));
        assert_eq!(state, WindowState::default());
        assert!(state.is_maximized);
    }

    #[test]
    fn test_save_load_round_trip() {
        let path = temp_path("roundtrip");
        let state = WindowState {
            width: 1600,
            height: 900,
            x: -8,
            y: 42,
            is_maximized: false,
        };
        state.save(&path).unwrap();
        let restored = WindowState::load(&path);
        assert_eq!(restored, state);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_camel_case_record() {
        let json = serde_json::to_string(&WindowState::default()).unwrap();
        assert!(json.contains("\"isMaximized\""));
        assert!(!json.contains("is_maximized"));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let path = temp_path("corrupt");
        fs::write(&path, "][").unwrap();
        assert_eq!(WindowState::load(&path), WindowState::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_to_unwritable_path_errors_without_panic() {
        let state = WindowState::default();
        // /proc is not writable; the caller logs this and carries on.
        assert!(state.save(Path::new("/proc/ferricord/window-state.json")).is_err());
    }
}
