//! Configuration for the OData client.

use crate::errors::{ODataError, ODataResult};
use crate::resilience::RetryPolicy;
use std::time::Duration;

/// Default request timeout, applied per underlying attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// OData protocol version advertised on every request.
pub const ODATA_VERSION: &str = "4.0";

/// Configuration for the OData client.
#[derive(Debug, Clone)]
pub struct ODataConfig {
    /// Request timeout, applied per underlying attempt.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Retry policy for the default transport.
    pub retry: RetryPolicy,

    /// Connection pool configuration.
    pub pool: PoolConfig,
}

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum idle connections per host.
    pub max_idle_per_host: usize,

    /// TCP keepalive interval.
    pub keepalive: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            keepalive: Some(Duration::from_secs(60)),
        }
    }
}

impl Default for ODataConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            retry: RetryPolicy::default(),
            pool: PoolConfig::default(),
        }
    }
}

impl ODataConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ODataConfigBuilder {
        ODataConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ODataResult<()> {
        if self.timeout.is_zero() {
            return Err(ODataError::configuration("Timeout must be non-zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ODataError::configuration(
                "Retry policy must allow at least one attempt",
            ));
        }
        if !self.retry.backoff_factor.is_finite() || self.retry.backoff_factor < 0.0 {
            return Err(ODataError::configuration(
                "Backoff factor must be a non-negative finite number",
            ));
        }
        Ok(())
    }
}

fn default_user_agent() -> String {
    format!("odata-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Builder for [`ODataConfig`].
#[derive(Debug, Default)]
pub struct ODataConfigBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
    retry: Option<RetryPolicy>,
    pool: Option<PoolConfig>,
}

impl ODataConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets the connection pool configuration.
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ODataResult<ODataConfig> {
        let config = ODataConfig {
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            retry: self.retry.unwrap_or_default(),
            pool: self.pool.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ODataConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(180));
        assert!(config.user_agent.starts_with("odata-client/"));
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn test_custom_config() {
        let config = ODataConfig::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("test-agent/1.0")
            .retry(RetryPolicy::no_retries())
            .build()
            .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ODataConfig::builder().timeout(Duration::ZERO).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = ODataConfig::builder()
            .retry(RetryPolicy::default().max_attempts(0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_backoff_factor_rejected() {
        let result = ODataConfig::builder()
            .retry(RetryPolicy::default().backoff_factor(-1.0))
            .build();
        assert!(matches!(result, Err(ODataError::Configuration(_))));
    }

    #[test]
    fn test_non_finite_backoff_factor_rejected() {
        for factor in [f64::NAN, f64::INFINITY] {
            let result = ODataConfig::builder()
                .retry(RetryPolicy::default().backoff_factor(factor))
                .build();
            assert!(result.is_err());
        }
    }
}
