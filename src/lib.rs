//! Ferricord: a desktop shell that renders the Discord web app inside a
//! constrained webview.
//!
//! The privileged controller process owns every OS resource (windows,
//! tray, persisted state, network policy) and exposes a closed,
//! capability-scoped bridge to content, which is treated as adversarial.
//! See `bridge` for the content-facing contract, `filter` for the network
//! whitelist, and `app` for window lifecycle and tray integration.

use tauri::webview::PageLoadEvent;
use tauri::Manager;

mod app;
mod bridge;
mod capture;
mod config;
mod controller;
mod error;
mod filter;
mod mods;
mod window_state;

use capture::PickerState;
use config::Config;
use controller::Controller;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load();

    tauri::Builder::default()
        // Registered first so a duplicate launch activates this instance
        // before anything else runs.
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            log::info!("Second instance blocked; restoring existing window");
            app::window::restore_main(app);
        }))
        .plugin(tauri_plugin_opener::init())
        .manage(Controller::new(config))
        .manage(PickerState::default())
        .on_window_event(app::events::handle_window_event)
        .on_page_load(|webview, payload| {
            // The plugin loader runs exactly once, after the post-splash
            // navigation to the trusted origin has finished loading.
            if webview.label() != app::window::MAIN_LABEL
                || !matches!(payload.event(), PageLoadEvent::Finished)
            {
                return;
            }
            let webview = webview.clone();
            let controller = webview.state::<Controller>();
            if controller.splash_ended() {
                controller.load_plugins_once(|| mods::load(&webview));
            }
        })
        .invoke_handler(tauri::generate_handler![
            bridge::bridge,
            capture::picker_sources,
            capture::picker_select,
            app::tray::favicon_updated,
        ])
        .setup(|app| {
            app::tray::init(app)?;
            app::window::create_main_window(app)?;
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
