//! Screen-share consent flow.
//!
//! Content asks for capture sources through the bridge; the controller
//! enumerates them, opens its own picker window (controller chrome, never
//! content), and resolves the pending call with the id the user clicked,
//! or the reserved cancel sentinel when the user clicks Cancel or closes
//! the picker. Content never sees the unselected sources.
//!
//! The flow is a two-state machine, `idle` ↔ `selecting`: at most one
//! selection may be active, and a second enumeration request while one is
//! pending is rejected rather than queued.

pub mod sources;

use parking_lot::Mutex;
use tauri::{AppHandle, Manager, Runtime, State, WebviewUrl, WebviewWindowBuilder};
use tokio::sync::oneshot;

use crate::error::{FerricordError, FerricordResult};

pub use sources::{CaptureSource, SourceOptions, CANCEL_ID};

/// Label of the picker window.
pub const PICKER_LABEL: &str = "capture-picker";

#[derive(Default)]
struct PickerInner {
    /// Present exactly while a selection flow is active.
    pending: Option<oneshot::Sender<String>>,
    /// Snapshot served to the picker page; cleared on resolution.
    sources: Vec<CaptureSource>,
}

/// Managed state for the selection flow.
#[derive(Default)]
pub struct PickerState {
    inner: Mutex<PickerInner>,
}

impl PickerState {
    /// Enter `selecting` with a fresh snapshot, or fail if a flow is
    /// already active.
    fn begin(&self, sources: Vec<CaptureSource>) -> FerricordResult<oneshot::Receiver<String>> {
        let mut inner = self.inner.lock();
        if inner.pending.is_some() {
            return Err(FerricordError::PickerBusy);
        }
        let (tx, rx) = oneshot::channel();
        inner.pending = Some(tx);
        inner.sources = sources;
        Ok(rx)
    }

    /// Resolve the active flow with the given id. Returns `false` when no
    /// flow is active (stale picker events are harmless no-ops).
    fn resolve(&self, id: String) -> bool {
        let mut inner = self.inner.lock();
        inner.sources.clear();
        match inner.pending.take() {
            Some(tx) => tx.send(id).is_ok(),
            None => false,
        }
    }

    /// Resolve the active flow as cancelled, if there is one.
    pub fn cancel(&self) -> bool {
        self.resolve(CANCEL_ID.to_string())
    }

    fn snapshot(&self) -> Vec<CaptureSource> {
        self.inner.lock().sources.clone()
    }
}

/// Serve a `getSources` bridge call end to end: enumerate, show the picker,
/// await the user's choice. Returns the selected source id, or the cancel
/// sentinel.
pub async fn request_sources<R: Runtime>(
    app: &AppHandle<R>,
    picker: &PickerState,
    options: SourceOptions,
) -> FerricordResult<String> {
    let sources = sources::enumerate(&options);
    log::debug!("Capture enumeration returned {} source(s)", sources.len());

    let rx = picker.begin(sources)?;

    if let Err(e) = open_picker_window(app) {
        // No surface to choose from: resolve as cancelled and report.
        picker.cancel();
        return Err(e);
    }

    // Sender dropped without a send means the flow died with the window.
    let id = rx.await.unwrap_or_else(|_| CANCEL_ID.to_string());

    if let Some(window) = app.get_webview_window(PICKER_LABEL) {
        let _ = window.close();
    }
    Ok(id)
}

fn open_picker_window<R: Runtime>(app: &AppHandle<R>) -> FerricordResult<()> {
    if let Some(window) = app.get_webview_window(PICKER_LABEL) {
        // A stale picker window without a pending flow; reuse it.
        let _ = window.show();
        let _ = window.set_focus();
        return Ok(());
    }
    WebviewWindowBuilder::new(app, PICKER_LABEL, WebviewUrl::App("picker.html".into()))
        .title("Share your screen")
        .inner_size(520.0, 420.0)
        .resizable(false)
        .minimizable(false)
        .maximizable(false)
        .always_on_top(true)
        .center()
        .build()?;
    Ok(())
}

/// Snapshot readback for the picker page. Rejects any caller other than
/// the picker window itself.
#[tauri::command]
pub fn picker_sources<R: Runtime>(
    window: tauri::WebviewWindow<R>,
    picker: State<'_, PickerState>,
) -> FerricordResult<Vec<CaptureSource>> {
    if window.label() != PICKER_LABEL {
        return Err(FerricordError::Forbidden(window.label().to_string()));
    }
    Ok(picker.snapshot())
}

/// Selection click from the picker page (a real source id, or the cancel
/// sentinel from the Cancel button).
#[tauri::command]
pub fn picker_select<R: Runtime>(
    window: tauri::WebviewWindow<R>,
    picker: State<'_, PickerState>,
    id: String,
) -> FerricordResult<()> {
    if window.label() != PICKER_LABEL {
        return Err(FerricordError::Forbidden(window.label().to_string()));
    }
    if !picker.resolve(id) {
        log::debug!("Picker selection arrived with no pending flow; ignoring");
    }
    let _ = window.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str) -> CaptureSource {
        CaptureSource {
            id: id.to_string(),
            name: id.to_string(),
            thumbnail: String::new(),
        }
    }

    #[test]
    fn test_begin_then_resolve_round_trip() {
        let picker = PickerState::default();
        let rx = picker.begin(vec![source("screen:0")]).unwrap();
        assert_eq!(picker.snapshot().len(), 1);
        assert!(picker.resolve("screen:0".to_string()));
        assert_eq!(rx.blocking_recv().unwrap(), "screen:0");
        // Flow is back to idle; snapshot is gone.
        assert!(picker.snapshot().is_empty());
    }

    #[test]
    fn test_second_flow_while_selecting_is_rejected() {
        let picker = PickerState::default();
        let _rx = picker.begin(vec![]).unwrap();
        assert!(matches!(
            picker.begin(vec![]),
            Err(FerricordError::PickerBusy)
        ));
    }

    #[test]
    fn test_cancel_resolves_with_sentinel() {
        let picker = PickerState::default();
        let rx = picker.begin(vec![source("window:7")]).unwrap();
        assert!(picker.cancel());
        assert_eq!(rx.blocking_recv().unwrap(), CANCEL_ID);
    }

    #[test]
    fn test_resolution_returns_to_idle() {
        let picker = PickerState::default();
        let rx = picker.begin(vec![]).unwrap();
        picker.cancel();
        drop(rx);
        // A fresh flow may start now.
        assert!(picker.begin(vec![]).is_ok());
    }

    #[test]
    fn test_stale_events_are_no_ops() {
        let picker = PickerState::default();
        assert!(!picker.resolve("screen:0".to_string()));
        assert!(!picker.cancel());
    }

    #[test]
    fn test_sentinel_distinct_from_all_ids_in_response() {
        let sources = vec![source("screen:0"), source("window:1"), source("window:2")];
        assert!(sources.iter().all(|s| s.id != CANCEL_ID));
    }
}
