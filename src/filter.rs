//! Outbound request filter.
//!
//! The whitelist is an ordered list of glob patterns (`*` wildcard). Each
//! pattern is compiled exactly once per content load into the regular
//! expression `^` + pattern with every `*` replaced by `.*`: an anchored
//! prefix match, so a pattern covers the given prefix and everything after
//! it. A URL is allowed iff at least one compiled pattern matches; denial
//! is silent by design so content cannot distinguish a blocked destination
//! from an absent one.
//!
//! The filter starts disarmed: loads issued during the splash phase (the
//! trusted origin itself) bypass it, and it is armed strictly after the
//! splash transition is in flight.

use std::sync::atomic::{AtomicBool, Ordering};

use regex::Regex;

/// Verdict for a single intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Compiled whitelist, immutable for the lifetime of one content load.
pub struct RequestFilter {
    patterns: Vec<Regex>,
    armed: AtomicBool,
}

impl RequestFilter {
    /// Compile the whitelist. Patterns that do not form a valid expression
    /// after the `*` rewrite are skipped with a warning rather than taking
    /// the whole filter down.
    pub fn compile(whitelist: &[String]) -> Self {
        let patterns = whitelist
            .iter()
            .filter_map(|pattern| {
                let expr = format!("^{}", pattern.replace('*', ".*"));
                match Regex::new(&expr) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        log::warn!("Skipping unusable whitelist pattern {pattern:?}: {e}");
                        None
                    }
                }
            })
            .collect();
        Self {
            patterns,
            armed: AtomicBool::new(false),
        }
    }

    /// Decide whether a request may proceed. Pure with respect to the
    /// compiled pattern set; safe to call from any hook the host offers.
    pub fn decide(&self, url: &str) -> Decision {
        if self.patterns.iter().any(|re| re.is_match(url)) {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    /// Activate filtering. Called once the post-splash navigation to the
    /// trusted origin is in flight.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}
