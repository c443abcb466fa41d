//! Retry with exponential backoff and jitter.
//!
//! [`with_retry`] runs an attempt closure up to
//! [`RetryPolicy::max_attempts`] times. Between failed attempts it sleeps
//! `base_delay * 2^i + jitter` where `i` is the zero-based index of the
//! attempt that just failed and `jitter` is uniform in `[0, max_jitter)`.
//! Sleeping goes through the [`Sleeper`] trait so tests can substitute a
//! clock that records delays instead of waiting.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

/// Tunable parameters for the backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failure, before jitter.
    pub base_delay: Duration,
    /// Exclusive upper bound of the random offset added to every delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Delay to wait after attempt `attempt_index` (zero-based) has failed.
///
/// `jitter_fraction` is clamped into `[0, 1)` and scaled by
/// [`RetryPolicy::max_jitter`].
pub fn backoff_delay(policy: &RetryPolicy, attempt_index: u32, jitter_fraction: f64) -> Duration {
    let factor = 2u32.checked_pow(attempt_index).unwrap_or(u32::MAX);
    let fraction = if jitter_fraction.is_finite() {
        jitter_fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    // Integer nanoseconds keep the upper bound exclusive.
    let max_jitter_nanos = u64::try_from(policy.max_jitter.as_nanos()).unwrap_or(u64::MAX);
    let jitter_nanos =
        ((max_jitter_nanos as f64 * fraction) as u64).min(max_jitter_nanos.saturating_sub(1));
    policy
        .base_delay
        .saturating_mul(factor)
        .saturating_add(Duration::from_nanos(jitter_nanos))
}

/// Source of suspension between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the Tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Every attempt failed.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    /// Error from the final attempt; `None` only when `max_attempts` is zero.
    pub last_error: Option<E>,
}

/// Run `attempt` until it succeeds or `max_attempts` attempts have failed.
///
/// The closure receives the zero-based attempt index. No sleep follows the
/// final attempt.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut attempt: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut last_error = None;

    for index in 0..policy.max_attempts {
        match attempt(index).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(
                    attempt = index + 1,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Attempt failed",
                );
                last_error = Some(e);
            }
        }

        if index + 1 < policy.max_attempts {
            let delay = backoff_delay(policy, index, rand::random::<f64>());
            tracing::info!(
                attempt = index + 1,
                delay_ms = delay.as_millis() as u64,
                "Backing off before retry",
            );
            sleeper.sleep(delay).await;
        }
    }

    Err(RetryExhausted {
        attempts: policy.max_attempts,
        last_error,
    })
}
