//! # Retry Policy and Sleep Abstraction
//!
//! Every wait in the pipeline (send retries, confirmation polls, page
//! retries) goes through a [`Sleeper`]. Production code uses
//! [`TokioSleeper`]; tests inject a recorder and run without real delays.
//!
//! [`RetryPolicy`] is shared by the submitter and the paginated fetcher:
//! a total attempt budget and a fixed delay between attempts.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::{Error, Result};

/// Suspends the current workflow for a fixed delay.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real-time sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded attempts with a fixed delay between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A single attempt, no retry.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Runs `attempt` until it succeeds, fails with a non-retryable error,
    /// or the budget is spent. Exhaustion is reported as
    /// [`Error::RetryLimitExceeded`] carrying the last transient error.
    pub async fn run<T, F, Fut>(
        &self,
        sleeper: &dyn Sleeper,
        operation: &str,
        mut attempt: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempts >= self.max_attempts => {
                    warn!(
                        "{} failed on attempt {}/{}: {}. Giving up.",
                        operation, attempts, self.max_attempts, e
                    );
                    return Err(Error::RetryLimitExceeded {
                        operation: operation.to_string(),
                        attempts,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!(
                        "{} failed on attempt {}/{}: {}. Retrying in {:?}...",
                        operation, attempts, self.max_attempts, e, self.delay
                    );
                    sleeper.sleep(self.delay).await;
                }
            }
        }
    }
}
