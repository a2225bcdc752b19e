//! Retry policy for transient HTTP failures: exponential backoff with jitter.

use rand::{RngExt, rng};
use std::time::Duration;

/// Status codes retried at the transport layer, for every verb.
/// Application-level errors (validation, other 4xx) are never retried.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(status: u16) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }

    /// Backoff before the given retry attempt (1-based): uniform jitter in
    /// `[0, base * 2^(attempt-1)]`, exponent capped to keep the sleep bounded.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(6);
        let max_delay = self.base_delay * (1u32 << exponent);
        let max_ms = max_delay.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = rng();
        Duration::from_millis(rng.random_range(0..=max_ms))
    }
}
