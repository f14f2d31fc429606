//! Application lifecycle and platform integration.
//!
//! - `window`: main/settings window construction, second-instance restore
//! - `events`: window event handlers (close/hide, focus, maximize sync)
//! - `tray`: tray icon setup and favicon sync

pub mod events;
pub mod tray;
pub mod window;
