//! Configuration for model calls made during extraction

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the extraction stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Retries after a transient failure, per model call
    pub transient_retry_budget: u32,

    /// Delay before the first retry (milliseconds); doubles each time
    pub retry_backoff_ms: u64,

    /// Maximum time for a single model call (seconds)
    pub call_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Get the initial retry delay as a Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Retry policy for model calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.transient_retry_budget,
            base_delay: self.retry_backoff(),
            call_timeout: self.call_timeout(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        if self.transient_retry_budget > 10 {
            return Err("transient_retry_budget cannot exceed 10".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            transient_retry_budget: 3,
            retry_backoff_ms: 500,
            call_timeout_secs: 180,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: fail fast, for interactive runs
    pub fn aggressive() -> Self {
        Self {
            transient_retry_budget: 1,
            retry_backoff_ms: 200,
            call_timeout_secs: 60,
        }
    }

    /// Lenient preset: ride out rate limiting on large batches
    pub fn lenient() -> Self {
        Self {
            transient_retry_budget: 6,
            retry_backoff_ms: 2_000,
            call_timeout_secs: 300,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
