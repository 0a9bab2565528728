//! Retry policy for catalog requests.

use std::time::Duration;

/// Maximum attempts per logical request (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Wait before the second attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(60);
pub const DEFAULT_MULTIPLIER: u32 = 2;

/// Bounded exponential backoff.
///
/// The wait before attempt `k + 1` (zero-based `k`) is
/// `base_delay * multiplier^k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration, multiplier: u32) -> Self {
        Self {
            max_attempts,
            base_delay,
            multiplier,
        }
    }

    /// Delay to wait after the failed attempt with zero-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }

    /// Every wait a request may go through, in order.
    pub fn delays(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.delay_for(attempt))
            .collect()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY, DEFAULT_MULTIPLIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delays(),
            vec![Duration::from_secs(60), Duration::from_secs(120)]
        );
    }

    #[test]
    fn test_delays_grow_strictly() {
        let policy = RetryPolicy::new(6, Duration::from_millis(250), 3);
        let delays = policy.delays();
        assert_eq!(delays.len(), 5);
        for pair in delays.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert_eq!(delays[4], Duration::from_millis(250 * 81));
    }

    #[test]
    fn test_single_attempt_never_waits() {
        let policy = RetryPolicy::new(1, Duration::from_secs(60), 2);
        assert!(policy.delays().is_empty());
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(100, Duration::from_secs(60), 2);
        assert_eq!(
            policy.delay_for(90),
            Duration::from_secs(60).saturating_mul(u32::MAX)
        );
        assert!(policy.delay_for(91) >= policy.delay_for(90));
    }
}
