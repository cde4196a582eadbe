//! Reusable retry policy for transient network failures.
//!
//! Only failures the operation classifies as transient
//! ([`DoormanError::is_transient`]) are retried; anything else propagates
//! on the first attempt without consuming the budget.

use doorman_core::error::DoormanError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Max attempts and backoff base for a retried operation.
///
/// Backoff before attempt `n + 1` is `base_delay * n`, giving 2s/4s
/// spacing for the default three attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Drive `op` until it succeeds, fails permanently, or exhausts the
    /// attempt budget. Exhaustion maps to `GenerationExhausted`.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, DoormanError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, DoormanError>>,
    {
        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    warn!("transient failure on attempt {attempt}/{}: {e}", self.max_attempts);
                    last_error = e.to_string();
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.base_delay * attempt).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(DoormanError::GenerationExhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }
}
