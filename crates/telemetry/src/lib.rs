//! Internal telemetry for the consent tracker: structured logging,
//! in-process counters, and the file-based error-log side channel.

pub mod error_log;
pub mod metrics;
pub mod tracing_setup;

pub use error_log::{ErrorLogger, FailedOperation};
pub use metrics::{metrics, Metrics};
pub use tracing_setup::{init_tracing, init_tracing_from_env, TracingConfig};
