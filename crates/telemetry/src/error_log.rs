//! File-based error log for failed operations.
//!
//! Failed persistence operations are appended as line-delimited JSON to
//! a per-day file (`error-YYYY-MM-DD.log`) for offline diagnosis. Writes
//! retry a bounded number of times with a fixed delay; a record that
//! still cannot be written is logged and dropped, never escalated to the
//! request that triggered it.

use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, warn};

const WRITE_ATTEMPTS: u32 = 3;
const WRITE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// One structured record of a failed operation.
#[derive(Debug, Clone, Serialize)]
pub struct FailedOperation {
    pub timestamp: String,
    pub operation: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl FailedOperation {
    pub fn new(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            operation: operation.into(),
            error: error.into(),
            payload: None,
        }
    }

    /// Attach the offending payload for later replay/diagnosis.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Appends [`FailedOperation`] records to a daily-rotated NDJSON file.
#[derive(Debug, Clone)]
pub struct ErrorLogger {
    dir: PathBuf,
}

impl ErrorLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file records go to right now.
    pub fn current_file(&self) -> PathBuf {
        self.dir
            .join(format!("error-{}.log", Utc::now().format("%Y-%m-%d")))
    }

    /// Append one record, retrying a bounded number of times.
    pub async fn record(&self, entry: FailedOperation) {
        let line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "Failed to serialize error-log record");
                return;
            }
        };

        let path = self.current_file();
        for attempt in 1..=WRITE_ATTEMPTS {
            match append_line(&self.dir, &path, &line) {
                Ok(()) => return,
                Err(e) if attempt < WRITE_ATTEMPTS => {
                    warn!(
                        attempt,
                        error = %e,
                        "Error-log write failed, retrying"
                    );
                    tokio::time::sleep(WRITE_RETRY_DELAY).await;
                }
                Err(e) => {
                    error!(
                        error = %e,
                        path = %path.display(),
                        "Giving up on error-log write"
                    );
                }
            }
        }
    }
}

fn append_line(dir: &Path, path: &Path, line: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{line}")
}
