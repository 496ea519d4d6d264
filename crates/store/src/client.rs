//! Connection pool construction.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use tracker_core::{Error, Result};

use crate::config::StoreConfig;

/// Build a connection pool from configuration.
///
/// The pool is the only shared resource between requests; it is created
/// once at startup and handed to [`crate::PgStore`] explicitly, never
/// held in a process-wide global.
pub async fn connect(config: &StoreConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| Error::store(format!("Failed to connect to PostgreSQL: {}", e)))?;

    info!(
        max_connections = config.max_connections,
        "Created PostgreSQL connection pool"
    );

    Ok(pool)
}
