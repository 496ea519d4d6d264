//! Mock implementations for testing.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use pg_store::{EventStore, StoredEvent};
use tracker_core::{Error, Result, TrackingEvent};

/// In-memory store implementing the same `EventStore` trait as the real
/// PostgreSQL adapter, so the full router and handler stack runs
/// unchanged in tests.
#[derive(Clone)]
pub struct MockStore {
    rows: Arc<Mutex<Vec<StoredEvent>>>,
    next_id: Arc<AtomicI64>,
    fail_insert: Arc<AtomicBool>,
    fail_list: Arc<AtomicBool>,
    fail_ping: Arc<AtomicBool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            fail_insert: Arc::new(AtomicBool::new(false)),
            fail_list: Arc::new(AtomicBool::new(false)),
            fail_ping: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stored_rows(&self) -> Vec<StoredEvent> {
        self.rows.lock().clone()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn set_fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_ping(&self, fail: bool) {
        self.fail_ping.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MockStore {
    async fn insert(&self, event: &TrackingEvent) -> Result<i64> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(Error::store("Mock insert failure"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().push(StoredEvent {
            id,
            session_id: event.session_id.clone(),
            experiment_run_id: event.experiment_run_id.clone(),
            user_id: event.user_id.clone(),
            user_step: event.user_step,
            ip_address: event.ip_address.clone(),
            country: event.country.clone(),
            browser: event.browser.clone(),
            operating_system: event.operating_system.clone(),
            device_type: event.device_type.as_str().to_string(),
            consent_decision: event.consent_decision.as_str().to_string(),
            consent_timestamp: event.consent_timestamp.clone(),
            icon_timestamp: event.icon_timestamp.clone(),
            permission_decision: event.permission_decision.as_str().to_string(),
            decision_timestamp: event.decision_timestamp.clone(),
            decision_time_taken_sec: event.decision_time_taken_sec,
            survey_clicked: event.survey_clicked.clone(),
            survey_timestamp: event.survey_timestamp.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<StoredEvent>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::store("Mock list failure"));
        }

        // Insertion order reversed = most recent first.
        Ok(self.rows.lock().iter().rev().cloned().collect())
    }

    async fn ping(&self) -> Result<()> {
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(Error::store("Mock ping failure"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::{validate, TrackSubmission};

    fn sample_event() -> TrackingEvent {
        let submission: TrackSubmission =
            serde_json::from_value(crate::fixtures::valid_submission()).unwrap();
        validate(&submission).unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MockStore::new();
        let event = sample_event();

        assert_eq!(store.insert(&event).await.unwrap(), 1);
        assert_eq!(store.insert(&event).await.unwrap(), 2);
        assert_eq!(store.row_count(), 2);
    }

    #[tokio::test]
    async fn list_returns_most_recent_first() {
        let store = MockStore::new();
        let event = sample_event();

        store.insert(&event).await.unwrap();
        store.insert(&event).await.unwrap();

        let rows = store.list().await.unwrap();
        assert_eq!(rows[0].id, 2);
        assert_eq!(rows[1].id, 1);
    }

    #[tokio::test]
    async fn failure_modes_surface_as_store_errors() {
        let store = MockStore::new();
        store.set_fail_ping(true);
        assert!(store.ping().await.is_err());

        store.set_fail_insert(true);
        assert!(store.insert(&sample_event()).await.is_err());
    }
}
