//! Tray icon and favicon sync.
//!
//! The tray image is a derived artifact of the content's current favicon:
//! on every favicon notification the data URL is decoded, persisted to a
//! temp file, reloaded, capped to the platform tray height, and swapped in
//! wholesale. When the document has no favicon, or the payload does not
//! decode, the previous image stays. No error, no blank icon.

use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::imageops::FilterType;
use tauri::image::Image;
use tauri::tray::TrayIconBuilder;
use tauri::{App, AppHandle, Manager, Runtime};

use crate::app::window::MAIN_LABEL;
use crate::error::{FerricordError, FerricordResult};

/// Id of the application tray icon.
pub const TRAY_ID: &str = "main";

/// Tray images taller than this are downscaled, preserving aspect ratio.
#[cfg(target_os = "macos")]
const TRAY_HEIGHT_CAP: u32 = 22;
#[cfg(not(target_os = "macos"))]
const TRAY_HEIGHT_CAP: u32 = 32;

/// Set up the tray with the bundled icon. Menu and click behavior beyond
/// image updates live outside this core.
pub fn init(app: &App) -> FerricordResult<()> {
    let icon = Image::from_bytes(include_bytes!("../../icons/32x32.png"))?;
    TrayIconBuilder::with_id(TRAY_ID)
        .icon(icon)
        .tooltip("Ferricord")
        .build(app)?;
    Ok(())
}

/// Favicon notification from the content surface. `None` means the
/// document currently has no icon link; the previous tray image is kept.
#[tauri::command]
pub fn favicon_updated<R: Runtime>(
    app: AppHandle<R>,
    window: tauri::WebviewWindow<R>,
    favicon: Option<String>,
) -> FerricordResult<()> {
    if window.label() != MAIN_LABEL {
        return Err(FerricordError::Forbidden(window.label().to_string()));
    }
    let Some(data_url) = favicon else {
        log::debug!("No favicon in document; keeping current tray image");
        return Ok(());
    };
    match tray_image_from_favicon(&data_url) {
        Ok(image) => {
            if let Some(tray) = app.tray_by_id(TRAY_ID) {
                tray.set_icon(Some(image))?;
            }
        }
        Err(e) => log::warn!("Ignoring favicon update: {e}"),
    }
    Ok(())
}

/// Decode a favicon data URL into a tray-sized image, going through a temp
/// file so the decoded bytes survive for inspection.
fn tray_image_from_favicon(data_url: &str) -> FerricordResult<Image<'static>> {
    tray_image_from_favicon_at(data_url, &tray_image_path())
}

fn tray_image_from_favicon_at(
    data_url: &str,
    path: &std::path::Path,
) -> FerricordResult<Image<'static>> {
    let bytes = decode_data_url(data_url)?;
    std::fs::write(path, &bytes)?;

    let mut img = image::open(path)?;
    if img.height() > TRAY_HEIGHT_CAP {
        let (width, height) = scaled_size(img.width(), img.height(), TRAY_HEIGHT_CAP);
        img = img.resize_exact(width, height, FilterType::Lanczos3);
    }
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Image::new_owned(rgba.into_raw(), width, height))
}

/// Strip the `data:image/...;base64,` prefix and decode the payload.
fn decode_data_url(data_url: &str) -> FerricordResult<Vec<u8>> {
    let payload = match data_url.split_once("base64,") {
        Some((head, payload)) if head.starts_with("data:image/") => payload,
        _ => {
            let head = data_url.get(..40).unwrap_or(data_url);
            return Err(FerricordError::Favicon(format!(
                "not a base64 image data URL: {head}"
            )));
        }
    };
    STANDARD
        .decode(payload.trim())
        .map_err(|e| FerricordError::Favicon(e.to_string()))
}

/// New dimensions for a height-capped image, aspect ratio preserved.
fn scaled_size(width: u32, height: u32, cap: u32) -> (u32, u32) {
    let scaled = (width as u64 * cap as u64 / height as u64) as u32;
    (scaled.max(1), cap)
}

fn tray_image_path() -> PathBuf {
    std::env::temp_dir().join("ferricord-tray.png")
}
