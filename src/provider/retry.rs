//! Retry policy for provider calls.

use super::{ProviderError, ProviderFailure, Role};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Same delay after every failure.
    Fixed {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Doubling delay starting at `base_ms`, never above `cap_ms`.
    Exponential {
        /// First delay in milliseconds.
        base_ms: u64,
        /// Upper bound in milliseconds.
        cap_ms: u64,
    },
}

impl Backoff {
    /// Delay after the `attempt`-th failure (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Backoff::Exponential { base_ms, cap_ms } => {
                let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
                Duration::from_millis(base_ms.saturating_mul(factor).min(cap_ms))
            }
        }
    }
}

/// How many times to call the provider and how long to wait in between.
///
/// Transport failures and schema violations are retried alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, first call included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay schedule.
    #[serde(default = "default_backoff")]
    pub backoff: Backoff,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff() -> Backoff {
    Backoff::Fixed { delay_ms: 1000 }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff: default_backoff(),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries `retries` times with no delay.
    pub fn immediate(retries: u32) -> Self {
        Self {
            max_attempts: retries + 1,
            backoff: Backoff::Fixed { delay_ms: 0 },
        }
    }

    /// Runs `op` until it succeeds or attempts run out.
    ///
    /// `op` receives the 1-based attempt number.
    #[instrument(skip(self, op), fields(max_attempts = self.max_attempts))]
    pub async fn run<T, F, Fut>(&self, role: Role, mut op: F) -> Result<T, ProviderFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            info!(%role, attempt, "Provider call attempted");
            match op(attempt).await {
                Ok(value) => {
                    info!(%role, attempt, "Provider call succeeded");
                    return Ok(value);
                }
                Err(cause) => {
                    warn!(%role, attempt, error = %cause, "Provider call failed");
                    if attempt >= max_attempts {
                        return Err(ProviderFailure {
                            role,
                            attempts: attempt,
                            last: cause,
                        });
                    }
                    tokio::time::sleep(self.backoff.delay(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}
