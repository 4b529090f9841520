//! Transient-failure retries for model calls

use docket_domain::AdapterError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How often and how patiently to retry a model call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles for every further one
    pub base_delay: Duration,
    /// Limit for a single attempt; exceeding it is a transient failure
    pub call_timeout: Duration,
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            call_timeout: Duration::from_secs(60),
        }
    }

    fn delay_for(&self, retry: u32) -> Duration {
        // 1x, 2x, 4x ... of the base delay
        self.base_delay.saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            call_timeout: Duration::from_secs(180),
        }
    }
}

/// Run `op`, retrying transient failures with exponential backoff
///
/// Permanent failures are returned at once. After the last retry the last
/// transient error is returned.
pub async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, AdapterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    let mut retry = 0;
    loop {
        let outcome = match tokio::time::timeout(policy.call_timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(AdapterError::Transient(format!(
                "{} timed out after {:?}",
                what, policy.call_timeout
            ))),
        };

        match outcome {
            Err(e) if e.is_transient() && retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for(retry);
                warn!(
                    "{} failed ({}), retry {}/{} in {:?}",
                    what, e, retry, policy.max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}
