//! Fixed-window rate limiting for the ingest route.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fixed-window rate limiter keyed by client address.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    config: RateLimitConfig,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Count a request against the key's current window.
    pub fn check(&self, key: &str) -> RateDecision {
        let mut windows = self.windows.lock();
        let now = Instant::now();

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.config.window {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.config.max_requests {
            window.count += 1;
            RateDecision::Allowed
        } else {
            let remaining = self
                .config
                .window
                .saturating_sub(now.duration_since(window.started));
            RateDecision::Limited {
                retry_after_secs: remaining.as_secs().max(1),
            }
        }
    }

    /// Drop windows that have been idle past expiry.
    pub fn cleanup_stale(&self) {
        let mut windows = self.windows.lock();
        let now = Instant::now();
        let max_age = self.config.window * 2;

        windows.retain(|_, w| now.duration_since(w.started) < max_age);
    }
}

/// Shared rate limiter state.
pub type SharedRateLimiter = Arc<RateLimiter>;
