//! Table DDL for the tracking events store.

use sqlx::PgPool;
use tracing::debug;

use tracker_core::{Error, Result};

/// SQL for creating the tracking_events table.
///
/// Timestamp fields submitted by the client are stored as TEXT so that
/// read-back reproduces exactly what was accepted; `created_at` is the
/// server-side insertion order key.
pub const CREATE_TRACKING_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tracking_events (
    id BIGSERIAL PRIMARY KEY,

    -- Identifiers
    session_id TEXT NOT NULL,
    experiment_run_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    user_step INTEGER NOT NULL DEFAULT 1,

    -- Client information
    ip_address VARCHAR(45) NOT NULL,
    country TEXT NOT NULL,
    browser TEXT NOT NULL,
    operating_system TEXT NOT NULL,
    device_type TEXT NOT NULL,

    -- Decisions
    consent_decision TEXT NOT NULL,
    consent_timestamp TEXT NOT NULL,
    icon_timestamp TEXT,
    permission_decision TEXT NOT NULL,
    decision_timestamp TEXT NOT NULL,
    decision_time_taken_sec DOUBLE PRECISION,

    -- Survey follow-up
    survey_clicked TEXT NOT NULL DEFAULT 'N/A',
    survey_timestamp TEXT,

    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Index supporting the most-recent-first listing.
pub const CREATE_CREATED_AT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_tracking_events_created_at
ON tracking_events (created_at DESC)
"#;

/// All DDL statements, in execution order.
pub fn all_statements() -> Vec<&'static str> {
    vec![CREATE_TRACKING_EVENTS_TABLE, CREATE_CREATED_AT_INDEX]
}

/// Initialize the database schema.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for sql in all_statements() {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| Error::store(format!("Schema init error: {}", e)))?;
    }
    debug!("PostgreSQL schema initialized");
    Ok(())
}
