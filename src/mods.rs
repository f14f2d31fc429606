//! Plugin loader.
//!
//! Plugins are plain JavaScript files dropped into the `plugins/` folder
//! of the config directory. The core guarantees exactly one load pass per
//! session, strictly after the post-splash navigation to the trusted
//! origin completes; what the scripts do inside content is out of scope
//! here.

use std::fs;
use std::path::Path;

use tauri::{Runtime, Webview};

use crate::config::plugins_dir;

/// Evaluate every plugin script into the content webview. Missing
/// directory or unreadable files are logged and skipped.
pub fn load<R: Runtime>(webview: &Webview<R>) {
    let scripts = collect_scripts(&plugins_dir());
    if scripts.is_empty() {
        log::info!("No plugins to load");
        return;
    }
    for (name, source) in scripts {
        match webview.eval(source.as_str()) {
            Ok(()) => log::info!("Loaded plugin {name}"),
            Err(e) => log::warn!("Plugin {name} failed to load: {e}"),
        }
    }
}

/// Gather `.js` files from the plugin directory, sorted by file name so
/// load order is deterministic.
fn collect_scripts(dir: &Path) -> Vec<(String, String)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    let mut scripts: Vec<(String, String)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "js"))
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            match fs::read_to_string(&path) {
                Ok(source) => Some((name, source)),
                Err(e) => {
                    log::warn!("Cannot read plugin {}: {e}", path.display());
                    None
                }
            }
        })
        .collect();
    scripts.sort_by(|a, b| a.0.cmp(&b.0));
    scripts
}
