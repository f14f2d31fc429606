//! The controller context.
//!
//! One `Controller` is constructed per process by `run()` and placed in
//! Tauri managed state; every component reaches it through `Manager::state`
//! instead of module-level globals. It owns the read-only configuration,
//! the compiled request filter, and the small set of session latches the
//! lifecycle protocol needs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};

use crate::config::Config;
use crate::filter::RequestFilter;

pub struct Controller {
    pub config: Config,
    /// Shared with the webview navigation hook.
    pub filter: Arc<RequestFilter>,
    /// `splashEnd` may fire exactly once per session.
    splash_ended: AtomicBool,
    /// Plugin loading happens exactly once, after post-splash navigation.
    plugins_loaded: Once,
    /// Last maximize state mirrored into the content DOM.
    maximized: AtomicBool,
}

impl Controller {
    pub fn new(config: Config) -> Self {
        let filter = Arc::new(RequestFilter::compile(&config.whitelist));
        Self {
            config,
            filter,
            splash_ended: AtomicBool::new(false),
            plugins_loaded: Once::new(),
            maximized: AtomicBool::new(false),
        }
    }

    /// Latch the end of the splash phase. Returns `true` only for the first
    /// caller; later calls are no-ops.
    pub fn end_splash(&self) -> bool {
        !self.splash_ended.swap(true, Ordering::SeqCst)
    }

    pub fn splash_ended(&self) -> bool {
        self.splash_ended.load(Ordering::SeqCst)
    }

    /// Run the plugin loader at most once per session.
    pub fn load_plugins_once(&self, load: impl FnOnce()) {
        self.plugins_loaded.call_once(load);
    }

    /// Record the observed maximize state, returning the previous value so
    /// callers can emit DOM notifications only on transitions.
    pub fn swap_maximized(&self, maximized: bool) -> bool {
        self.maximized.swap(maximized, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splash_latch_is_exactly_once() {
        let controller = Controller::new(Config::default());
        assert!(!controller.splash_ended());
        assert!(controller.end_splash());
        assert!(controller.splash_ended());
        // Second and later calls are no-ops.
        assert!(!controller.end_splash());
        assert!(!controller.end_splash());
    }

    #[test]
    fn test_plugins_load_once() {
        let controller = Controller::new(Config::default());
        let mut calls = 0;
        controller.load_plugins_once(|| calls += 1);
        controller.load_plugins_once(|| calls += 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_maximized_transitions() {
        let controller = Controller::new(Config::default());
        assert!(!controller.swap_maximized(true));
        assert!(controller.swap_maximized(true));
        assert!(controller.swap_maximized(false));
    }

    #[test]
    fn test_filter_compiled_from_config() {
        let controller = Controller::new(Config::default());
        assert_eq!(
            controller.filter.decide("https://discord.com/login"),
            crate::filter::Decision::Allow
        );
        assert_eq!(
            controller.filter.decide("https://tracker.evil.io/beacon"),
            crate::filter::Decision::Deny
        );
    }
}
