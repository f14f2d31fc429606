//! Window event handlers.
//!
//! Close handling is the delicate part: geometry is persisted
//! synchronously inside the close-request handler, and the close is then
//! either converted to a hide (minimize-to-tray) or escalated to full
//! application exit. `prevent_close` runs before anything else, so there
//! is no interval in which the surface is closing yet still serving
//! content operations.

use tauri::{Manager, Runtime, Window, WindowEvent};

use crate::app::window::MAIN_LABEL;
use crate::capture::{PickerState, PICKER_LABEL};
use crate::controller::Controller;
use crate::window_state::WindowState;

/// Hooked into the Tauri builder's `on_window_event`.
pub fn handle_window_event<R: Runtime>(window: &Window<R>, event: &WindowEvent) {
    match event {
        WindowEvent::CloseRequested { api, .. } if window.label() == MAIN_LABEL => {
            api.prevent_close();
            persist_geometry(window);

            let controller = window.state::<Controller>();
            if controller.config.minimize_to_tray {
                log::info!("Close converted to hide (minimizeToTray)");
                let _ = window.hide();
            } else {
                log::info!("Close requested; exiting");
                window.app_handle().exit(0);
            }
        }

        // One-way notifications into the content DOM. Content may style on
        // these attributes but cannot block or alter the transition.
        WindowEvent::Focused(focused) if window.label() == MAIN_LABEL => {
            let script = if *focused {
                r#"document.body.removeAttribute("unFocused");"#
            } else {
                r#"document.body.setAttribute("unFocused", "");"#
            };
            eval_in_content(window, script);
        }

        // The host reports no dedicated maximize event; resize is the
        // signal, deduplicated through the controller's cached flag.
        WindowEvent::Resized(_) if window.label() == MAIN_LABEL => {
            let maximized = window.is_maximized().unwrap_or(false);
            let controller = window.state::<Controller>();
            if controller.swap_maximized(maximized) != maximized {
                let script = if maximized {
                    r#"document.body.setAttribute("isMaximized", "");"#
                } else {
                    r#"document.body.removeAttribute("isMaximized");"#
                };
                eval_in_content(window, script);
            }
        }

        // Picker dismissed without a choice: resolve the pending selection
        // as cancelled.
        WindowEvent::Destroyed if window.label() == PICKER_LABEL => {
            if window.state::<PickerState>().cancel() {
                log::debug!("Picker window closed; selection cancelled");
            }
        }

        _ => {}
    }
}

/// Snapshot and persist the main window geometry. Failure is logged and
/// the session continues with in-memory geometry only.
fn persist_geometry<R: Runtime>(window: &Window<R>) {
    match WindowState::from_window(window) {
        Ok(state) => state.persist(),
        Err(e) => log::warn!("Could not read window geometry: {e}"),
    }
}

fn eval_in_content<R: Runtime>(window: &Window<R>, script: &str) {
    if let Some(webview) = window.app_handle().get_webview_window(window.label()) {
        let _ = webview.eval(script);
    }
}
