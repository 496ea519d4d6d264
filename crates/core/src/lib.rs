//! Core types, validation, and timing derivation for the consent tracker.

pub mod error;
pub mod event;
pub mod timing;
pub mod validate;

pub use error::{Error, Result};
pub use event::*;
pub use timing::decision_seconds;
pub use validate::{validate, ValidationFailure};
