//! Explicit retry policy for the insert path.
//!
//! A transactional backend does not need retries, so the default is a
//! single attempt. The policy is a constructor parameter rather than
//! logic inlined in a handler, so a flaky backend can opt in to a
//! bounded fixed-delay loop without touching callers.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never below 1.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Single attempt, no delay.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Bounded fixed-delay retries.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
