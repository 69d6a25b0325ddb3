//! Retry policy for transient server failures.
//!
//! Retries are transport-internal: the default transport replays a request
//! when the response status is in the retryable set, sleeping an exponential
//! backoff between attempts. Transport exceptions and successful responses
//! carrying an OData error body are never retried.

use std::time::Duration;

/// Immutable retry configuration, fixed at client construction.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// HTTP status codes that trigger a retry.
    pub retryable_statuses: Vec<u16>,
    /// Multiplier for exponential backoff, in seconds.
    pub backoff_factor: f64,
    /// Upper bound on a single backoff sleep.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retryable_statuses: vec![429, 500, 502, 503, 504],
            backoff_factor: 2.0,
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total attempt count.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the retryable status codes.
    pub fn retryable_statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.retryable_statuses = statuses.into();
        self
    }

    /// Sets the backoff multiplier.
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Sets the maximum backoff duration.
    pub fn max_backoff(mut self, max: Duration) -> Self {
        self.max_backoff = max;
        self
    }

    /// Creates a policy that never retries.
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Returns true if the status code is in the retryable set.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Computes the backoff before the given retry (1-based).
    ///
    /// Negative or non-finite factors are rejected at configuration
    /// validation; a policy constructed without validation still gets a
    /// well-defined result, with such factors treated as zero backoff.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = 2f64.powi(retry.saturating_sub(1) as i32);
        let secs = (self.backoff_factor * exp)
            .max(0.0)
            .min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.retryable_statuses, vec![429, 500, 502, 503, 504]);
        assert_eq!(policy.backoff_factor, 2.0);
    }

    #[test]
    fn test_retryable_statuses() {
        let policy = RetryPolicy::default();
        assert!(policy.is_retryable_status(429));
        assert!(policy.is_retryable_status(500));
        assert!(policy.is_retryable_status(503));
        assert!(!policy.is_retryable_status(400));
        assert!(!policy.is_retryable_status(404));
        assert!(!policy.is_retryable_status(200));
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
        assert_eq!(policy.backoff(4), Duration::from_secs(16));
    }

    #[test]
    fn test_backoff_respects_max() {
        let policy = RetryPolicy::default().max_backoff(Duration::from_secs(10));
        assert_eq!(policy.backoff(10), Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_never_panics_on_bad_factor() {
        for factor in [-1.0, f64::NAN, f64::NEG_INFINITY] {
            let policy = RetryPolicy::default().backoff_factor(factor);
            assert_eq!(policy.backoff(1), Duration::ZERO);
        }

        let policy = RetryPolicy::default().backoff_factor(f64::INFINITY);
        assert_eq!(policy.backoff(1), policy.max_backoff);
    }

    #[test]
    fn test_no_retries() {
        let policy = RetryPolicy::no_retries();
        assert_eq!(policy.max_attempts, 1);
    }
}
