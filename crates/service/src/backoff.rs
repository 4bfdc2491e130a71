//! Exponential backoff with jitter for transient network failures.

use crate::errors::ServiceError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
            jitter_factor: 0.6,
        }
    }
}

/// Runs `op` until it succeeds or `max_retries` attempts are exhausted.
/// Each failure sleeps `delay + uniform(0, jitter_factor * delay)`, then
/// doubles the delay, capped at `max_delay`.
///
/// On exhaustion only the `MaxRetriesReached` sentinel is returned; the
/// underlying errors are logged per attempt, not propagated.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut op: F,
    config: &RetryConfig,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.initial_delay;

    for attempt in 1..=config.max_retries {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let jitter = Duration::from_secs_f64(
                    fastrand::f64() * config.jitter_factor * delay.as_secs_f64(),
                );
                let next_delay = delay + jitter;
                warn!(
                    attempt,
                    next_delay_ms = next_delay.as_millis() as u64,
                    error = %err,
                    "attempt failed, backing off"
                );
                tokio::time::sleep(next_delay).await;
                delay = (delay * 2).min(config.max_delay);
            }
        }
    }

    Err(ServiceError::MaxRetriesReached)
}
