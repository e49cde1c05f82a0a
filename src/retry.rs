//! Bounded retries for transient read failures

use backoff::{backoff::Backoff, ExponentialBackoff};
use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

use crate::error::{LiquidityError, Result};

/// Attempt budget and exponential delay schedule between attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    /// Delays are drawn from `interval * (1 ± randomization_factor)`
    pub randomization_factor: f64,
}

impl RetryPolicy {
    /// Constant delay, no jitter
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_interval: delay,
            max_interval: delay,
            multiplier: 1.0,
            randomization_factor: 0.0,
        }
    }

    fn schedule(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_interval,
            initial_interval: self.initial_interval,
            randomization_factor: self.randomization_factor,
            multiplier: self.multiplier,
            max_interval: self.max_interval,
            // The attempt budget bounds the loop
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            multiplier: 2.0,
            randomization_factor: 0.5,
        }
    }
}

/// Run `operation` until it succeeds, `should_retry` rejects the error, or
/// `policy.max_attempts` attempts have been made. The last error is returned.
pub async fn with_retry<T, F, Fut, P>(
    label: &str,
    policy: &RetryPolicy,
    should_retry: P,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&LiquidityError) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut schedule = policy.schedule();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts && should_retry(&e) => {
                let delay = schedule.next_backoff().unwrap_or(policy.max_interval);
                warn!(
                    "{} failed (attempt {}/{}), retrying in {}ms: {}",
                    label,
                    attempt,
                    max_attempts,
                    delay.as_millis(),
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!("{} failed (attempt {}/{}): {}", label, attempt, max_attempts, e);
                return Err(e);
            }
        }
    }
}

/// Retry predicate for pool and position reads
pub fn transient(error: &LiquidityError) -> bool {
    error.is_transient()
}
