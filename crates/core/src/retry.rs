//! Bounded exponential-backoff policy for rate-limited submissions.
//!
//! The first cooldown is configurable (`RETRY_DELAY_MS`); growth, ceiling
//! and attempt cap are fixed.

use std::time::Duration;

/// Default first cooldown after a rate-limit response.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(10_000);

/// Factor applied to the cooldown after each rate-limited attempt.
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Upper bound on a single cooldown.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(300);

/// Total submission attempts per record, including the first.
pub const MAX_ATTEMPTS: u32 = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Cooldown before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each rate-limited attempt.
    pub multiplier: f64,
    /// Attempts allowed before the record is given up on.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_initial_delay(DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    pub fn with_initial_delay(initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay: MAX_RETRY_DELAY.max(initial_delay),
            multiplier: BACKOFF_MULTIPLIER,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Calculate the next backoff delay, clamped to `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.multiplier) as u64;
        Duration::from_millis(next_ms).min(self.max_delay)
    }

    /// Cooldown to wait after the given (1-based) rate-limited attempt,
    /// or `None` once the attempt budget is spent.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }
        let mut delay = self.initial_delay.min(self.max_delay);
        for _ in 1..attempt {
            delay = self.next_delay(delay);
        }
        Some(delay)
    }
}
