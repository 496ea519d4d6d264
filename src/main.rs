//! Consent Tracker ingestion service
//!
//! Small HTTP endpoint handling:
//! - Consent/permission decision validation with aggregated field errors
//! - Single-row PostgreSQL persistence with read-back listing
//! - Health probe backed by a live database ping
//! - CORS allow-list and per-client rate limiting on the ingest route

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use api::{router, AppState};
use api::middleware::rate_limit::RateLimitConfig;
use pg_store::{PgStore, RetryPolicy, StoreConfig};
use telemetry::{init_tracing_from_env, ErrorLogger};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Deployment environment; "production" hides diagnostic detail
    #[serde(default = "default_environment")]
    environment: String,

    /// Origins allowed to call the API
    #[serde(default = "default_allowed_origins")]
    allowed_origins: Vec<String>,

    /// Directory for the failed-operation log files
    #[serde(default = "default_error_log_dir")]
    error_log_dir: String,

    /// Requests allowed on /track per window per client
    #[serde(default = "default_rate_limit_max_requests")]
    rate_limit_max_requests: u32,

    /// Rate limit window in seconds
    #[serde(default = "default_rate_limit_window_secs")]
    rate_limit_window_secs: u64,

    /// Insert retry attempts (1 = no retry; Postgres does not need one)
    #[serde(default = "default_insert_attempts")]
    insert_attempts: u32,

    /// Delay between insert attempts in milliseconds
    #[serde(default = "default_insert_retry_delay_ms")]
    insert_retry_delay_ms: u64,

    #[serde(default)]
    store: StoreConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_error_log_dir() -> String {
    "logs".to_string()
}

fn default_rate_limit_max_requests() -> u32 {
    100
}

fn default_rate_limit_window_secs() -> u64 {
    15 * 60
}

fn default_insert_attempts() -> u32 {
    1
}

fn default_insert_retry_delay_ms() -> u64 {
    200
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            allowed_origins: default_allowed_origins(),
            error_log_dir: default_error_log_dir(),
            rate_limit_max_requests: default_rate_limit_max_requests(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            insert_attempts: default_insert_attempts(),
            insert_retry_delay_ms: default_insert_retry_delay_ms(),
            store: StoreConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!(
        "Starting consent tracker v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = load_config()?;

    info!(
        environment = %config.environment,
        allowed_origins = ?config.allowed_origins,
        "Loaded configuration"
    );

    // Build the connection pool and make sure the table exists
    let pool = pg_store::connect(&config.store)
        .await
        .context("Failed to connect to PostgreSQL")?;

    pg_store::schema::init_schema(&pool)
        .await
        .context("Failed to initialize database schema")?;

    let retry = if config.insert_attempts > 1 {
        RetryPolicy::fixed(
            config.insert_attempts,
            Duration::from_millis(config.insert_retry_delay_ms),
        )
    } else {
        RetryPolicy::none()
    };
    let store = Arc::new(PgStore::with_retry(pool, retry));

    // Startup health check; the service still starts if the first ping
    // fails, /health will keep reporting unhealthy until it recovers
    if pg_store::health::check_connection(&store).await {
        info!("PostgreSQL connection: healthy");
    } else {
        error!("PostgreSQL connection: unhealthy");
    }

    // Create application state
    let state = AppState::with_rate_limit(
        store,
        ErrorLogger::new(&config.error_log_dir),
        config.environment.clone(),
        config.allowed_origins.clone(),
        RateLimitConfig {
            max_requests: config.rate_limit_max_requests,
            window: Duration::from_secs(config.rate_limit_window_secs),
        },
    );

    // Start rate limiter cleanup background task
    let _rate_limiter_cleanup = state.start_rate_limiter_cleanup();

    // Create router
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let totals = telemetry::metrics().snapshot();
    info!(
        submissions_received = totals.submissions_received,
        events_accepted = totals.events_accepted,
        events_rejected = totals.events_rejected,
        store_errors = totals.store_errors,
        rate_limited = totals.rate_limited,
        "Final ingest counters"
    );

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("TRACKER")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested and list-valued fields the config
    // crate's env parsing does not handle reliably
    if let Ok(url) = std::env::var("TRACKER_DATABASE_URL") {
        config.store.url = url;
    } else if let Ok(url) = std::env::var("DATABASE_URL") {
        config.store.url = url;
    }
    if let Ok(origins) = std::env::var("TRACKER_ALLOWED_ORIGINS") {
        config.allowed_origins = origins.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Ok(environment) = std::env::var("TRACKER_ENVIRONMENT") {
        config.environment = environment;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
