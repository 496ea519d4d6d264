//! Startup health check.

use tracing::{debug, error};

use crate::adapter::{EventStore, PgStore};

/// Check PostgreSQL connection health.
pub async fn check_connection(store: &PgStore) -> bool {
    match store.ping().await {
        Ok(()) => {
            debug!("PostgreSQL connection healthy");
            true
        }
        Err(e) => {
            error!("PostgreSQL health check failed: {}", e);
            false
        }
    }
}
