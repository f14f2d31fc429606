//! Window construction and lifecycle entry points.
//!
//! The main window is created hidden with geometry restored from the
//! persisted window state, a fully custom-drawn frame, and the capability
//! bridge installed before any content runs. Navigation decisions (request
//! filter + external-link hand-off) are wired here because the hosting
//! layer invokes them per top-level request.

use tauri::{App, AppHandle, Manager, Runtime, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_opener::OpenerExt;

use crate::bridge;
use crate::config::window_state_path;
use crate::controller::Controller;
use crate::error::FerricordResult;
use crate::filter::{Decision, RequestFilter};
use crate::window_state::WindowState;

/// Label of the content surface.
pub const MAIN_LABEL: &str = "main";

/// Label of the settings surface.
pub const SETTINGS_LABEL: &str = "settings";

/// Create the main content window: hidden, undecorated, restored geometry,
/// splash document loaded, bridge init script installed. Shows the window
/// unless the configuration says to start minimized.
pub fn create_main_window(app: &App) -> FerricordResult<WebviewWindow> {
    let controller = app.state::<Controller>();
    let state = WindowState::load(&window_state_path());
    let script = bridge::init_script(&controller.config);

    let filter = controller.filter.clone();
    let handle = app.handle().clone();
    let window = WebviewWindowBuilder::new(app, MAIN_LABEL, WebviewUrl::App("splash.html".into()))
        .title("Ferricord")
        .inner_size(state.width as f64, state.height as f64)
        .position(state.x as f64, state.y as f64)
        .decorations(false)
        .visible(false)
        .initialization_script(script.as_str())
        .on_navigation(move |url| navigation_decision(&handle, &filter, url))
        .build()?;

    if state.is_maximized {
        // Reapply maximize after construction; the window manager clamps to
        // the platform's maximum working area.
        let _ = window.maximize();
    }

    if controller.config.start_minimized {
        log::info!("startMinimized set; keeping main window hidden");
    } else {
        let _ = window.show();
    }

    Ok(window)
}

/// Per-request decision invoked by the webview for every top-level
/// navigation.
///
/// Splash-phase loads pass through untouched (the filter is not yet
/// armed). Once armed: whitelisted URLs stay in-app; a denied `http`,
/// `https` or `mailto` target is handed to the OS default handler and the
/// in-app navigation is always refused, so content can never open a second
/// top-level navigation inside the controlled surface. Any other denied
/// target is dropped with no user-visible signal.
fn navigation_decision<R: Runtime>(
    app: &AppHandle<R>,
    filter: &RequestFilter,
    url: &Url,
) -> bool {
    if !filter.is_armed() {
        return true;
    }
    match filter.decide(url.as_str()) {
        Decision::Allow => true,
        Decision::Deny => {
            if matches!(url.scheme(), "http" | "https" | "mailto") {
                log::debug!("Opening {url} externally");
                if let Err(e) = app.opener().open_url(url.as_str(), None::<&str>) {
                    log::warn!("Failed to open {url} externally: {e}");
                }
            }
            false
        }
    }
}

/// Open the settings surface, enforcing at most one: a duplicate request
/// focuses the existing window instead of creating a second one.
pub fn open_settings_window<R: Runtime>(app: &AppHandle<R>) -> FerricordResult<()> {
    if let Some(window) = app.get_webview_window(SETTINGS_LABEL) {
        let _ = window.show();
        let _ = window.set_focus();
        return Ok(());
    }
    WebviewWindowBuilder::new(app, SETTINGS_LABEL, WebviewUrl::App("settings.html".into()))
        .title("Ferricord Settings")
        .inner_size(750.0, 600.0)
        .center()
        .build()?;
    Ok(())
}

/// Bring the existing main window back: un-minimize, show, focus. Used by
/// second-instance activation, where a duplicate launch must activate this
/// instance instead of running.
pub fn restore_main<R: Runtime>(app: &AppHandle<R>) {
    if let Some(window) = app.get_webview_window(MAIN_LABEL) {
        if window.is_minimized().unwrap_or(false) {
            let _ = window.unminimize();
        }
        let _ = window.show();
        let _ = window.set_focus();
    }
}
