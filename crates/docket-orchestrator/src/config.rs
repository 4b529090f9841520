//! Configuration for batch runs
//!
//! Gate sizes, file limits, retry settings and archive limits.

use docket_extractor::{ExtractorConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MIB: u64 = 1024 * 1024;

/// Limits applied when flattening `.zip` bundles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveLimits {
    /// Archives with more entries are left untouched
    pub max_entries: usize,
    /// Larger entries are dropped
    pub max_entry_bytes: u64,
    /// Archives whose kept entries add up to more are left untouched
    pub max_total_bytes: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_entries: 200,
            max_entry_bytes: 50 * MIB,
            max_total_bytes: 500 * MIB,
        }
    }
}

/// Configuration for the batch orchestrator
///
/// # Examples
///
/// ```
/// use docket_orchestrator::OrchestratorConfig;
///
/// let config = OrchestratorConfig::default();
/// assert_eq!(config.download_concurrency, 50);
///
/// let config = OrchestratorConfig::conservative();
/// assert_eq!(config.download_concurrency, 8);
///
/// let config = OrchestratorConfig::high_throughput();
/// assert_eq!(config.processing_concurrency, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Download slots per run
    pub download_concurrency: usize,

    /// Classify/extract/score slots per run
    pub processing_concurrency: usize,

    /// Listed files above this size end in ERROR without being downloaded
    pub max_file_size_bytes: u64,

    /// Files beyond this count are skipped with a warning
    pub max_files_per_batch: usize,

    /// Retries after a transient model failure, per call
    pub transient_retry_budget: u32,

    /// Delay before the first retry (milliseconds); doubles each time
    pub retry_backoff_ms: u64,

    /// Maximum time for one model call (seconds)
    pub call_timeout_secs: u64,

    /// Score (on the 0..=1 scale) for records that could not be audited
    pub audit_fallback_score: f64,

    /// Bundle flattening limits
    pub archive: ArchiveLimits,

    /// Extensions that become tasks (lowercase, no dot)
    pub allowed_extensions: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let extraction = ExtractorConfig::default();
        Self {
            download_concurrency: 50,
            processing_concurrency: 50,
            max_file_size_bytes: 100 * MIB,
            max_files_per_batch: 300,
            transient_retry_budget: extraction.transient_retry_budget,
            retry_backoff_ms: extraction.retry_backoff_ms,
            call_timeout_secs: extraction.call_timeout_secs,
            audit_fallback_score: 0.7,
            archive: ArchiveLimits::default(),
            allowed_extensions: ["pdf", "png", "jpg", "jpeg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl OrchestratorConfig {
    /// Small gates and patient retries, for rate-limited accounts
    pub fn conservative() -> Self {
        let extraction = ExtractorConfig::lenient();
        Self {
            download_concurrency: 8,
            processing_concurrency: 4,
            transient_retry_budget: extraction.transient_retry_budget,
            retry_backoff_ms: extraction.retry_backoff_ms,
            call_timeout_secs: extraction.call_timeout_secs,
            ..Self::default()
        }
    }

    /// Wide gates and quick failure, for large batches on a high quota
    pub fn high_throughput() -> Self {
        let extraction = ExtractorConfig::aggressive();
        Self {
            download_concurrency: 100,
            processing_concurrency: 100,
            max_files_per_batch: 1_000,
            transient_retry_budget: extraction.transient_retry_budget,
            retry_backoff_ms: extraction.retry_backoff_ms,
            call_timeout_secs: extraction.call_timeout_secs,
            ..Self::default()
        }
    }

    /// Model-call settings as the extractor sees them
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            transient_retry_budget: self.transient_retry_budget,
            retry_backoff_ms: self.retry_backoff_ms,
            call_timeout_secs: self.call_timeout_secs,
        }
    }

    /// Retry policy for every model call
    pub fn retry_policy(&self) -> RetryPolicy {
        self.extractor_config().retry_policy()
    }

    /// Get the first retry delay as a Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Whether a lowercase extension is accepted
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.download_concurrency == 0 || self.processing_concurrency == 0 {
            return Err("concurrency limits must be greater than 0".to_string());
        }
        if self.max_files_per_batch == 0 {
            return Err("max_files_per_batch must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.audit_fallback_score) {
            return Err(format!(
                "audit_fallback_score must be between 0.0 and 1.0, got {}",
                self.audit_fallback_score
            ));
        }
        if self.allowed_extensions.is_empty() {
            return Err("allowed_extensions cannot be empty".to_string());
        }
        if self.archive.max_entries == 0 || self.archive.max_entry_bytes == 0 {
            return Err("archive limits must be greater than 0".to_string());
        }
        if self.archive.max_total_bytes < self.archive.max_entry_bytes {
            return Err(
                "archive.max_total_bytes must be at least archive.max_entry_bytes".to_string(),
            );
        }
        self.extractor_config().validate()
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
