//! Test server construction.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState};
use telemetry::ErrorLogger;

use crate::mocks::MockStore;

/// Full application wiring against a mock store. Each test spins up its
/// own `TestServer` from `router`.
pub struct TestContext {
    pub router: Router,
    pub store: Arc<MockStore>,
    pub error_log_dir: PathBuf,
}

impl TestContext {
    /// Default context: generous rate limit so ordinary tests never
    /// trip it.
    pub fn new() -> Self {
        Self::with_rate_limit(RateLimitConfig {
            max_requests: 10_000,
            window: Duration::from_secs(60),
        })
    }

    pub fn with_rate_limit(rate_config: RateLimitConfig) -> Self {
        let store = Arc::new(MockStore::new());
        let error_log_dir = unique_log_dir();

        let state = AppState::with_rate_limit(
            store.clone(),
            ErrorLogger::new(&error_log_dir),
            "test",
            vec!["http://localhost:3000".to_string()],
            rate_config,
        );

        Self {
            router: router(state),
            store,
            error_log_dir,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn unique_log_dir() -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    std::env::temp_dir().join(format!(
        "consent-tracker-test-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ))
}
