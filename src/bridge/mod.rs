//! The capability bridge.
//!
//! This is the only channel through which content may affect controller
//! state. The operation set is a closed enum: an invoke payload either
//! deserializes into one of the declared operations or is rejected at the
//! transport boundary before any handler runs. There is no dynamic
//! registry, no string-keyed dispatch, and therefore no escape hatch into
//! the privileged process.
//!
//! Synchronous capabilities (version strings, `titlebar.isTitlebar`) are
//! baked into the init script as literals, so their values are known to
//! content before its first script runs and never change afterwards.

use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Runtime, State};

use crate::app::window::{open_settings_window, MAIN_LABEL};
use crate::capture::{self, PickerState, SourceOptions};
use crate::config::Config;
use crate::controller::Controller;
use crate::error::{FerricordError, FerricordResult};
use crate::window_state::WindowState;

/// Everything content may ask the controller to do.
///
/// `window.*` commands, `titlebar.inject`, `splashEnd` and
/// `openSettingsWindow` are fire-and-forget; `getSources` round-trips
/// through the consent picker.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "camelCase")]
pub enum BridgeOp {
    WindowShow,
    WindowHide,
    WindowMinimize,
    WindowMaximize,
    TitlebarInject,
    SplashEnd,
    OpenSettingsWindow,
    GetSources(SourceOptions),
}

/// Reply surface of the bridge.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BridgeReply {
    /// Fire-and-forget acknowledged (serializes as `null`).
    Ack,
    /// Outcome of a capture selection: a source id or the cancel sentinel.
    Selection { id: String },
}

/// Single entry point for every bridge operation. Only the main content
/// window is served; the fire-and-forget window commands always succeed
/// from content's point of view (a no-op when already in the target
/// state).
#[tauri::command]
pub async fn bridge<R: Runtime>(
    app: AppHandle<R>,
    window: tauri::WebviewWindow<R>,
    controller: State<'_, Controller>,
    picker: State<'_, PickerState>,
    request: BridgeOp,
) -> FerricordResult<BridgeReply> {
    if window.label() != MAIN_LABEL {
        return Err(FerricordError::Forbidden(window.label().to_string()));
    }

    match request {
        BridgeOp::WindowShow => {
            let _ = window.show();
            Ok(BridgeReply::Ack)
        }
        BridgeOp::WindowHide => {
            // Geometry is recorded on every hide, same as the close path.
            if let Ok(state) = WindowState::from_webview_window(&window) {
                state.persist();
            }
            let _ = window.hide();
            Ok(BridgeReply::Ack)
        }
        BridgeOp::WindowMinimize => {
            let _ = window.minimize();
            Ok(BridgeReply::Ack)
        }
        BridgeOp::WindowMaximize => {
            let _ = window.maximize();
            Ok(BridgeReply::Ack)
        }
        BridgeOp::TitlebarInject => {
            // The script itself is guarded by element id, so repeated calls
            // leave the DOM exactly as a single call would.
            let _ = window.eval(TITLEBAR_SCRIPT);
            Ok(BridgeReply::Ack)
        }
        BridgeOp::SplashEnd => {
            end_splash(&window, &controller)?;
            Ok(BridgeReply::Ack)
        }
        BridgeOp::OpenSettingsWindow => {
            open_settings_window(&app)?;
            Ok(BridgeReply::Ack)
        }
        BridgeOp::GetSources(options) => {
            let id = capture::request_sources(&app, &picker, options).await?;
            Ok(BridgeReply::Selection { id })
        }
    }
}

/// Swap the splash document for the trusted origin and arm the request
/// filter. Callable exactly once per session; later calls are no-ops.
fn end_splash<R: Runtime>(
    window: &tauri::WebviewWindow<R>,
    controller: &Controller,
) -> FerricordResult<()> {
    let target = &controller.config.discord_url;
    let url: tauri::Url = target
        .parse()
        .map_err(|e| FerricordError::Url(format!("{target}: {e}")))?;
    if !controller.end_splash() {
        log::debug!("splashEnd invoked again; ignoring");
        return Ok(());
    }
    log::info!("Splash complete; navigating to {target}");
    window.navigate(url)?;
    // The trusted-origin load is now in flight; everything after it goes
    // through the whitelist.
    controller.filter.arm();
    Ok(())
}

/// Build the init script that publishes `window.ferricord` into the
/// content global scope before any content script runs.
pub fn init_script(config: &Config) -> String {
    BRIDGE_SCRIPT
        .replace("__IS_TITLEBAR__", if config.custom_titlebar { "true" } else { "false" })
        .replace("__VERSION__", env!("CARGO_PKG_VERSION"))
        .replace("__RUNTIME_VERSION__", tauri::VERSION)
}

const BRIDGE_SCRIPT: &str = r#"
(() => {
  if (window.ferricord) { return; }
  const invoke = (op, args) =>
    window.__TAURI_INTERNALS__.invoke("bridge", {
      request: args === undefined ? { op } : { op, args },
    });
  const fire = (op) => { invoke(op).catch(() => {}); };

  window.ferricord = Object.freeze({
    window: Object.freeze({
      show: () => fire("windowShow"),
      hide: () => fire("windowHide"),
      minimize: () => fire("windowMinimize"),
      maximize: () => fire("windowMaximize"),
    }),
    titlebar: Object.freeze({
      inject: () => fire("titlebarInject"),
      isTitlebar: __IS_TITLEBAR__,
    }),
    version: "__VERSION__",
    runtimeVersion: "__RUNTIME_VERSION__",
    splashEnd: () => fire("splashEnd"),
    openSettingsWindow: () => fire("openSettingsWindow"),
    desktopCapturer: Object.freeze({
      getSources: (options) => invoke("getSources", options || { types: ["screen", "window"] }),
    }),
  });

  const currentFavicon = () => {
    const links = document.getElementsByTagName("link");
    let favicon;
    for (let i = 0; i < links.length; i++) {
      const rel = links[i].getAttribute("rel");
      if (rel === "icon" || rel === "shortcut icon") {
        favicon = links[i].getAttribute("href");
      }
    }
    return favicon;
  };
  const reportFavicon = () => {
    window.__TAURI_INTERNALS__
      .invoke("favicon_updated", { favicon: currentFavicon() ?? null })
      .catch(() => {});
  };
  window.addEventListener("DOMContentLoaded", () => {
    reportFavicon();
    new MutationObserver(reportFavicon).observe(document.head, {
      childList: true,
      subtree: true,
      attributes: true,
      attributeFilter: ["href", "rel"],
    });
  });
})();
"#;

/// Controller-side DOM mutation adding the custom title bar. Guarded by
/// element id: injecting twice produces the same DOM as injecting once.
const TITLEBAR_SCRIPT: &str = r#"
(() => {
  if (document.getElementById("ferricord-titlebar")) { return; }
  const bar = document.createElement("div");
  bar.id = "ferricord-titlebar";
  bar.style.cssText =
    "position:fixed;top:0;left:0;right:0;height:22px;z-index:10000;" +
    "display:flex;justify-content:flex-end;-webkit-app-region:drag;app-region:drag;";
  const controls = [
    ["ferricord-btn-minimize", "─", () => window.ferricord.window.minimize()],
    ["ferricord-btn-maximize", "□", () => window.ferricord.window.maximize()],
    ["ferricord-btn-close", "✕", () => window.ferricord.window.hide()],
  ];
  for (const [id, glyph, onClick] of controls) {
    const btn = document.createElement("button");
    btn.id = id;
    btn.textContent = glyph;
    btn.style.cssText =
      "width:28px;height:22px;border:none;background:transparent;color:inherit;" +
      "-webkit-app-region:no-drag;app-region:no-drag;cursor:pointer;";
    btn.addEventListener("click", onClick);
    bar.appendChild(btn);
  }
  document.body.appendChild(bar);
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_and_forget_ops_deserialize() {
        for op in [
            "windowShow",
            "windowHide",
            "windowMinimize",
            "windowMaximize",
            "titlebarInject",
            "splashEnd",
            "openSettingsWindow",
        ] {
            let payload = format!(r#"{{"op": "{op}"}}"#);
            assert!(
                serde_json::from_str::<BridgeOp>(&payload).is_ok(),
                "operation {op} must deserialize"
            );
        }
    }

    #[test]
    fn test_get_sources_carries_options() {
        let op: BridgeOp =
            serde_json::from_str(r#"{"op": "getSources", "args": {"types": ["screen"]}}"#)
                .unwrap();
        match op {
            BridgeOp::GetSources(options) => {
                assert_eq!(options.types, vec![crate::capture::sources::SourceKind::Screen]);
            }
            other => panic!("unexpected op: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_operation_rejected_at_transport() {
        // Anything outside the closed table must fail deserialization, not
        // reach a handler.
        for payload in [
            r#"{"op": "evalScript", "args": {"script": "1"}}"#,
            r#"{"op": "readFile", "args": {"path": "/etc/passwd"}}"#,
            r#"{"op": ""}"#,
            r#"{"args": {}}"#,
        ] {
            assert!(
                serde_json::from_str::<BridgeOp>(payload).is_err(),
                "payload must be rejected: {payload}"
            );
        }
    }

    #[test]
    fn test_ack_serializes_as_null() {
        assert_eq!(serde_json::to_string(&BridgeReply::Ack).unwrap(), "null");
    }

    #[test]
    fn test_selection_serializes_with_id() {
        let reply = BridgeReply::Selection {
            id: "screen:0".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"id":"screen:0"}"#
        );
    }

    #[test]
    fn test_init_script_resolves_all_placeholders() {
        let script = init_script(&Config::default());
        assert!(!script.contains("__IS_TITLEBAR__"));
        assert!(!script.contains("__VERSION__"));
        assert!(!script.contains("__RUNTIME_VERSION__"));
        assert!(script.contains("isTitlebar: true"));
        assert!(script.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_init_script_reflects_native_titlebar_config() {
        let config = Config {
            custom_titlebar: false,
            ..Config::default()
        };
        assert!(init_script(&config).contains("isTitlebar: false"));
    }

    #[test]
    fn test_titlebar_script_is_guarded_for_idempotence() {
        assert!(TITLEBAR_SCRIPT.contains(r#"getElementById("ferricord-titlebar")"#));
        assert!(TITLEBAR_SCRIPT.contains("return;"));
    }
}
