//! PostgreSQL persistence for the consent tracker.

pub mod adapter;
pub mod client;
pub mod config;
pub mod health;
pub mod retry;
pub mod schema;

pub use adapter::{EventStore, PgStore, StoredEvent};
pub use client::connect;
pub use config::StoreConfig;
pub use retry::RetryPolicy;
