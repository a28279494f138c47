use std::future::Future;
use std::time::Duration;

use airing_core::{WatchError, WatchResult};

/// Exponential backoff for transient network failures. Callers opt in explicitly.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or runs out of attempts.
pub async fn retry_with_backoff<T, F, Fut>(policy: BackoffPolicy, mut op: F) -> WatchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = WatchResult<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_err: Option<WatchError> = None;

    for attempt in 1..=attempts {
        if attempt > 1 {
            let delay = policy.delay_for(attempt - 1);
            tracing::warn!(
                attempt,
                "Transient failure, retrying in {:.1}s",
                delay.as_secs_f64()
            );
            tokio::time::sleep(delay).await;
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => last_err = Some(e),
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| WatchError::Network("retry attempts exhausted".to_string())))
}
