//! Capture source enumeration via xcap.
//!
//! Every enumeration takes a fresh snapshot; screens and windows appear
//! and disappear between calls, so nothing here is cached. Each source is
//! encoded as `{id, name, thumbnail}` where the thumbnail is a
//! self-contained `data:image/png;base64,` URL the picker page can embed
//! directly.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use xcap::{Monitor, Window};

/// Reserved id for the picker's Cancel entry. Real source ids are
/// namespaced (`screen:` / `window:`), so no enumeration result can
/// collide with it.
pub const CANCEL_ID: &str = "desktop-capturer-selection__cancel";

/// Bounding box for thumbnails (aspect ratio preserved).
const THUMBNAIL_MAX: u32 = 320;

/// Kinds of capture source content may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Screen,
    Window,
}

/// Options accepted by the source-enumeration operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOptions {
    #[serde(default = "default_types")]
    pub types: Vec<SourceKind>,
}

fn default_types() -> Vec<SourceKind> {
    vec![SourceKind::Screen, SourceKind::Window]
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            types: default_types(),
        }
    }
}

impl SourceOptions {
    fn wants(&self, kind: SourceKind) -> bool {
        self.types.contains(&kind)
    }
}

/// One selectable screen or window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSource {
    /// Opaque namespaced id, resolved by the controller only.
    pub id: String,
    /// Display name shown in the picker.
    pub name: String,
    /// `data:image/png;base64,` URL, empty when the preview grab failed.
    pub thumbnail: String,
}

/// Enumerate the currently available sources for the requested kinds.
///
/// OS failure (permission denied, no compositor, ...) degrades to an empty
/// list so the picker can still offer Cancel instead of crashing the flow.
pub fn enumerate(options: &SourceOptions) -> Vec<CaptureSource> {
    let mut sources = Vec::new();

    if options.wants(SourceKind::Screen) {
        match Monitor::all() {
            Ok(monitors) => {
                for (idx, monitor) in monitors.iter().enumerate() {
                    sources.push(CaptureSource {
                        id: format!("screen:{}", monitor.id().unwrap_or(idx as u32)),
                        name: monitor
                            .name()
                            .unwrap_or_else(|_| format!("Screen {}", idx + 1)),
                        thumbnail: monitor
                            .capture_image()
                            .ok()
                            .and_then(thumbnail_data_url)
                            .unwrap_or_default(),
                    });
                }
            }
            Err(e) => log::warn!("Monitor enumeration failed: {e}"),
        }
    }

    if options.wants(SourceKind::Window) {
        match Window::all() {
            Ok(windows) => {
                for window in windows.iter().filter(|w| is_window_listable(w)) {
                    sources.push(CaptureSource {
                        id: format!("window:{}", window.id().unwrap_or(0)),
                        name: window.title().unwrap_or_default(),
                        thumbnail: window
                            .capture_image()
                            .ok()
                            .and_then(thumbnail_data_url)
                            .unwrap_or_default(),
                    });
                }
            }
            Err(e) => log::warn!("Window enumeration failed: {e}"),
        }
    }

    sources
}

/// Minimized and untitled windows are not meaningful sharing targets.
fn is_window_listable(window: &Window) -> bool {
    if window.is_minimized().unwrap_or(true) {
        return false;
    }
    !window.title().unwrap_or_default().is_empty()
}

/// Downscale and encode a grabbed frame as an embeddable data URL.
fn thumbnail_data_url(image: RgbaImage) -> Option<String> {
    let thumbnail = DynamicImage::ImageRgba8(image).thumbnail(THUMBNAIL_MAX, THUMBNAIL_MAX);
    let mut buffer = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut buffer, image::ImageFormat::Png)
        .ok()?;
    Some(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(buffer.get_ref())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_ids_never_collide_with_cancel_sentinel() {
        // Real ids always carry a kind namespace; the sentinel carries none.
        for id in ["screen:0", "window:81923", "screen:4294967295"] {
            assert_ne!(id, CANCEL_ID);
            assert!(id.starts_with("screen:") || id.starts_with("window:"));
        }
        assert!(!CANCEL_ID.contains(':'));
    }

    #[test]
    fn test_source_options_default_requests_both_kinds() {
        let options = SourceOptions::default();
        assert!(options.wants(SourceKind::Screen));
        assert!(options.wants(SourceKind::Window));
    }

    #[test]
    fn test_source_options_deserialize_type_filter() {
        let options: SourceOptions = serde_json::from_str(r#"{"types": ["screen"]}"#).unwrap();
        assert!(options.wants(SourceKind::Screen));
        assert!(!options.wants(SourceKind::Window));
    }

    #[test]
    fn test_source_options_missing_types_defaults_to_both() {
        let options: SourceOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.types.len(), 2);
    }

    #[test]
    fn test_unknown_source_kind_is_rejected() {
        assert!(serde_json::from_str::<SourceOptions>(r#"{"types": ["audio"]}"#).is_err());
    }

    #[test]
    fn test_thumbnail_is_self_contained_data_url() {
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]));
        let url = thumbnail_data_url(image).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        // The payload must decode back to a PNG.
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = STANDARD.decode(payload).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_thumbnail_respects_bounding_box() {
        let image = RgbaImage::from_pixel(1920, 1080, image::Rgba([0, 0, 0, 255]));
        let url = thumbnail_data_url(image).unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = STANDARD.decode(payload).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.width() <= THUMBNAIL_MAX);
        assert!(decoded.height() <= THUMBNAIL_MAX);
        // Aspect ratio preserved: 16:9 input stays wider than tall.
        assert!(decoded.width() > decoded.height());
    }

    #[test]
    fn test_capture_source_serializes_camel_case() {
        let source = CaptureSource {
            id: "screen:0".to_string(),
            name: "Main".to_string(),
            thumbnail: String::new(),
        };
        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains("\"id\""));
        assert!(json.contains("\"thumbnail\""));
    }
}
