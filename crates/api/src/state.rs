//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use pg_store::EventStore;
use telemetry::ErrorLogger;

use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};

/// Shared application state.
///
/// The store handle is injected here once at startup; handlers never
/// reach for an ambient global.
#[derive(Clone)]
pub struct AppState {
    /// Event store (PostgreSQL in production, mock in tests)
    pub store: Arc<dyn EventStore>,
    /// Error-log side channel for failed operations
    pub error_log: ErrorLogger,
    /// Deployment environment ("production" gates diagnostic detail)
    pub environment: String,
    /// Origins allowed by the CORS layer
    pub allowed_origins: Vec<String>,
    /// Rate limiter for POST /track
    pub rate_limiter: SharedRateLimiter,
}

impl AppState {
    /// Assemble the shared state; the rate limit always comes from
    /// configuration.
    pub fn with_rate_limit(
        store: Arc<dyn EventStore>,
        error_log: ErrorLogger,
        environment: impl Into<String>,
        allowed_origins: Vec<String>,
        rate_config: RateLimitConfig,
    ) -> Self {
        Self {
            store,
            error_log,
            environment: environment.into(),
            allowed_origins,
            rate_limiter: Arc::new(RateLimiter::new(rate_config)),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Start the rate limiter cleanup background task.
    pub fn start_rate_limiter_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let rate_limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                rate_limiter.cleanup_stale();
            }
        })
    }
}
