//! Retry policy and exponential backoff schedules.
//!
//! [`RetryPolicy`] is an immutable configuration snapshot shared by the
//! startup readiness checks and the live stream reconnect loop.
//! [`Backoff`] produces the wait intervals of a single retry loop:
//! each interval is the previous one multiplied by the policy
//! multiplier, capped at `max_interval_ms`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff parameters for bounded retry loops.
///
/// Two schedules are derived from one policy: [`RetryPolicy::backoff`]
/// starts at `initial_interval_ms` and drives stream reconnects, while
/// [`RetryPolicy::confirmation_backoff`] starts at `sleep_time_ms` and
/// drives the topic confirmation and schema registry health loops.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryPolicy {
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub multiplier: f64,
    pub max_attempts: u32,
    pub sleep_time_ms: u64,
}

impl RetryPolicy {
    /// Checks the policy invariants, returning a configuration error
    /// naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.initial_interval_ms == 0 {
            return Err(Error::Config(
                "retry.initial_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_interval_ms < self.initial_interval_ms {
            return Err(Error::Config(
                "retry.max_interval_ms must be at least retry.initial_interval_ms".to_string(),
            ));
        }
        if self.multiplier <= 1.0 {
            return Err(Error::Config(
                "retry.multiplier must be greater than 1.0".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.sleep_time_ms == 0 {
            return Err(Error::Config(
                "retry.sleep_time_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Backoff schedule starting at `initial_interval_ms`.
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.initial_interval_ms, self.max_interval_ms, self.multiplier)
    }

    /// Backoff schedule starting at `sleep_time_ms`.
    ///
    /// Used by the topic confirmation and schema registry loops. One
    /// instance spans a whole `ensure_topics` invocation, so the
    /// interval keeps growing across topics and only resets on the
    /// next invocation.
    pub fn confirmation_backoff(&self) -> Backoff {
        Backoff::new(self.sleep_time_ms, self.max_interval_ms, self.multiplier)
    }
}

/// Generator for the wait intervals of one retry loop.
///
/// The n-th interval returned by [`Backoff::next_interval`] equals
/// `start * multiplier^(n-1)`, capped at the maximum interval.
#[derive(Debug, Clone)]
pub struct Backoff {
    current_ms: u64,
    max_ms: u64,
    multiplier: f64,
}

impl Backoff {
    fn new(start_ms: u64, max_ms: u64, multiplier: f64) -> Self {
        Self {
            current_ms: start_ms,
            max_ms,
            multiplier,
        }
    }

    /// Returns the next wait interval and grows the schedule.
    pub fn next_interval(&mut self) -> Duration {
        let interval_ms = self.current_ms.min(self.max_ms);
        self.current_ms = (self.current_ms as f64 * self.multiplier).round() as u64;
        Duration::from_millis(interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_policy() -> RetryPolicy {
        RetryPolicy {
            initial_interval_ms: 1000,
            max_interval_ms: 10_000,
            multiplier: 2.0,
            max_attempts: 3,
            sleep_time_ms: 2000,
        }
    }

    #[test]
    fn backoff_intervals_grow_multiplicatively() {
        let mut backoff = test_policy().backoff();

        assert_eq!(backoff.next_interval(), Duration::from_millis(1000));
        assert_eq!(backoff.next_interval(), Duration::from_millis(2000));
        assert_eq!(backoff.next_interval(), Duration::from_millis(4000));
        assert_eq!(backoff.next_interval(), Duration::from_millis(8000));
    }

    #[test]
    fn backoff_is_capped_at_max_interval() {
        let mut backoff = test_policy().backoff();

        for _ in 0..4 {
            backoff.next_interval();
        }
        assert_eq!(backoff.next_interval(), Duration::from_millis(10_000));
        assert_eq!(backoff.next_interval(), Duration::from_millis(10_000));
    }

    #[test]
    fn confirmation_backoff_starts_at_sleep_time() {
        let mut backoff = test_policy().confirmation_backoff();

        assert_eq!(backoff.next_interval(), Duration::from_millis(2000));
        assert_eq!(backoff.next_interval(), Duration::from_millis(4000));
    }

    #[test]
    fn fractional_multiplier_rounds_to_millis() {
        let policy = RetryPolicy {
            multiplier: 1.5,
            ..test_policy()
        };
        let mut backoff = policy.backoff();

        assert_eq!(backoff.next_interval(), Duration::from_millis(1000));
        assert_eq!(backoff.next_interval(), Duration::from_millis(1500));
        assert_eq!(backoff.next_interval(), Duration::from_millis(2250));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let ok = test_policy();
        assert!(ok.validate().is_ok());

        let bad = RetryPolicy {
            multiplier: 1.0,
            ..test_policy()
        };
        assert!(bad.validate().is_err());

        let bad = RetryPolicy {
            max_attempts: 0,
            ..test_policy()
        };
        assert!(bad.validate().is_err());

        let bad = RetryPolicy {
            sleep_time_ms: 0,
            ..test_policy()
        };
        assert!(bad.validate().is_err());

        let bad = RetryPolicy {
            max_interval_ms: 10,
            ..test_policy()
        };
        assert!(bad.validate().is_err());
    }
}
