//! Connection settings for the Argo server.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::RetryPolicy;

/// Default namespace workflows are created in and listed from.
pub const DEFAULT_NAMESPACE: &str = "argo";

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("filepipe/", env!("CARGO_PKG_VERSION"));

/// Argo server location, namespace and request policy.
///
/// ```rust
/// use filepipe_argo::ArgoConfig;
///
/// let config = ArgoConfig::new("https://argo-server.argo:2746".parse().unwrap())
///     .with_namespace("pipelines")
///     .with_insecure_tls(true);
/// assert_eq!(config.argo_namespace, "pipelines");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "argo configurations must be used to create clients"]
pub struct ArgoConfig {
    /// Base URL of the Argo server
    #[cfg_attr(feature = "config", arg(long = "argo-url", env = "ARGO_URL"))]
    pub argo_url: Url,

    /// Namespace workflows are submitted to
    #[cfg_attr(
        feature = "config",
        arg(long = "argo-namespace", env = "ARGO_NAMESPACE", default_value = DEFAULT_NAMESPACE)
    )]
    pub argo_namespace: String,

    /// Skip TLS certificate verification for self-signed in-cluster endpoints
    #[cfg_attr(
        feature = "config",
        arg(long = "argo-insecure-tls", env = "ARGO_INSECURE_TLS", default_value_t = false)
    )]
    pub argo_insecure_tls: bool,

    /// Total attempts per request, the first one included
    #[cfg_attr(
        feature = "config",
        arg(long = "argo-max-attempts", env = "ARGO_MAX_ATTEMPTS", default_value_t = 3)
    )]
    pub argo_max_attempts: u32,

    /// Delay between attempts in milliseconds
    #[cfg_attr(
        feature = "config",
        arg(long = "argo-retry-delay-ms", env = "ARGO_RETRY_DELAY_MS", default_value_t = 500)
    )]
    pub argo_retry_delay_ms: u64,

    /// Timeout of a single attempt in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "argo-timeout-secs", env = "ARGO_TIMEOUT_SECS", default_value_t = 30)
    )]
    pub argo_timeout_secs: u64,

    /// User agent sent with every request
    #[cfg_attr(
        feature = "config",
        arg(long = "argo-user-agent", env = "ARGO_USER_AGENT", default_value = DEFAULT_USER_AGENT)
    )]
    pub argo_user_agent: String,
}

impl ArgoConfig {
    /// Creates a configuration with the default namespace and retry policy.
    pub fn new(argo_url: Url) -> Self {
        let policy = RetryPolicy::default();
        Self {
            argo_url,
            argo_namespace: DEFAULT_NAMESPACE.to_owned(),
            argo_insecure_tls: false,
            argo_max_attempts: policy.max_attempts,
            argo_retry_delay_ms: policy.delay.as_millis() as u64,
            argo_timeout_secs: policy.timeout.as_secs(),
            argo_user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.argo_namespace = namespace.into();
        self
    }

    pub fn with_insecure_tls(mut self, insecure: bool) -> Self {
        self.argo_insecure_tls = insecure;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.argo_user_agent = user_agent.into();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.argo_max_attempts = policy.max_attempts;
        self.argo_retry_delay_ms = policy.delay.as_millis() as u64;
        self.argo_timeout_secs = policy.timeout.as_secs();
        self
    }

    /// Returns the retry policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.argo_max_attempts,
            Duration::from_millis(self.argo_retry_delay_ms),
            Duration::from_secs(self.argo_timeout_secs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_retry_policy() -> anyhow::Result<()> {
        let config = ArgoConfig::new("http://localhost:2746".parse()?);
        assert_eq!(config.argo_namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert!(config.argo_user_agent.starts_with("filepipe/"));
        Ok(())
    }

    #[test]
    fn retry_policy_round_trips() -> anyhow::Result<()> {
        let policy = RetryPolicy::new(5, Duration::from_millis(10), Duration::from_secs(2));
        let config = ArgoConfig::new("http://localhost:2746".parse()?).with_retry_policy(policy);
        assert_eq!(config.retry_policy(), policy);
        Ok(())
    }
}
