//! The persistence adapter: insert / list / ping over PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, warn};

use telemetry::metrics;
use tracker_core::{Error, Result, TrackingEvent};

use crate::retry::RetryPolicy;

/// A tracking event as read back from the table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredEvent {
    pub id: i64,
    pub session_id: String,
    pub experiment_run_id: String,
    pub user_id: String,
    pub user_step: i32,
    pub ip_address: String,
    pub country: String,
    pub browser: String,
    pub operating_system: String,
    pub device_type: String,
    pub consent_decision: String,
    pub consent_timestamp: String,
    pub icon_timestamp: Option<String>,
    pub permission_decision: String,
    pub decision_timestamp: String,
    pub decision_time_taken_sec: Option<f64>,
    pub survey_clicked: String,
    pub survey_timestamp: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Storage operations required by the HTTP surface.
///
/// Implemented by [`PgStore`] in production and by an in-memory mock in
/// the integration tests.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert one record atomically; returns the assigned identity.
    async fn insert(&self, event: &TrackingEvent) -> Result<i64>;

    /// All records, most recent first.
    async fn list(&self) -> Result<Vec<StoredEvent>>;

    /// Liveness check, independent of table content.
    async fn ping(&self) -> Result<()>;
}

const INSERT_EVENT: &str = r#"
INSERT INTO tracking_events (
    session_id, experiment_run_id, user_id, user_step,
    ip_address, country, browser, operating_system, device_type,
    consent_decision, consent_timestamp, icon_timestamp,
    permission_decision, decision_timestamp, decision_time_taken_sec,
    survey_clicked, survey_timestamp
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
RETURNING id
"#;

const LIST_EVENTS: &str = r#"
SELECT
    id, session_id, experiment_run_id, user_id, user_step,
    ip_address, country, browser, operating_system, device_type,
    consent_decision, consent_timestamp, icon_timestamp,
    permission_decision, decision_timestamp, decision_time_taken_sec,
    survey_clicked, survey_timestamp, created_at
FROM tracking_events
ORDER BY created_at DESC, id DESC
"#;

/// PostgreSQL-backed [`EventStore`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgStore {
    /// Single-attempt store; the right default for a transactional
    /// backend.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            retry: RetryPolicy::none(),
        }
    }

    /// Store with an explicit retry policy on the insert path.
    pub fn with_retry(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert_once(&self, event: &TrackingEvent) -> Result<i64> {
        // Validation already rejects overlong values; this guards the
        // VARCHAR(45) column itself.
        let ip: String = event.ip_address.chars().take(45).collect();

        let id: i64 = sqlx::query_scalar(INSERT_EVENT)
            .bind(&event.session_id)
            .bind(&event.experiment_run_id)
            .bind(&event.user_id)
            .bind(event.user_step)
            .bind(ip)
            .bind(&event.country)
            .bind(&event.browser)
            .bind(&event.operating_system)
            .bind(event.device_type.as_str())
            .bind(event.consent_decision.as_str())
            .bind(&event.consent_timestamp)
            .bind(&event.icon_timestamp)
            .bind(event.permission_decision.as_str())
            .bind(&event.decision_timestamp)
            .bind(event.decision_time_taken_sec)
            .bind(&event.survey_clicked)
            .bind(&event.survey_timestamp)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store(format!("Insert error: {}", e)))?;

        Ok(id)
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert(&self, event: &TrackingEvent) -> Result<i64> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.insert_once(event).await {
                Ok(id) => {
                    debug!(id, session_id = %event.session_id, "Inserted tracking event");
                    return Ok(id);
                }
                Err(e) if attempt < self.retry.max_attempts => {
                    warn!(attempt, error = %e, "Insert failed, retrying");
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(e) => {
                    metrics().store_errors.inc();
                    return Err(e);
                }
            }
        }
    }

    async fn list(&self) -> Result<Vec<StoredEvent>> {
        let rows: Vec<StoredEvent> = sqlx::query_as(LIST_EVENTS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                metrics().store_errors.inc();
                Error::store(format!("Query error: {}", e))
            })?;

        debug!(count = rows.len(), "Listed tracking events");
        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::store(format!("Ping error: {}", e)))?;
        Ok(())
    }
}
