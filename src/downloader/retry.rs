//! Fixed-delay retries
//!
//! Every failure is retried after the same pause until the attempt budget is
//! spent. The result says explicitly whether the operation finally succeeded,
//! so callers can branch on it instead of reading the log.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// Attempt budget and pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Attempts actually made: at least one
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Result of a retried operation
#[derive(Debug)]
pub enum AttemptOutcome<E> {
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32, last_error: E },
}

impl<E> AttemptOutcome<E> {
    pub fn succeeded(&self) -> bool {
        matches!(self, AttemptOutcome::Succeeded { .. })
    }

    pub fn attempts_used(&self) -> u32 {
        match self {
            AttemptOutcome::Succeeded { attempts } | AttemptOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    /// Last error, if every attempt failed
    pub fn error(&self) -> Option<&E> {
        match self {
            AttemptOutcome::Succeeded { .. } => None,
            AttemptOutcome::Exhausted { last_error, .. } => Some(last_error),
        }
    }
}

/// Run `operation` until it succeeds or the policy's attempts are used up
///
/// `label` names the work in log lines (usually the URL).
pub async fn run_with_retries<F, Fut, E>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> AttemptOutcome<E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let max_attempts = policy.effective_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(()) => {
                if attempt > 1 {
                    info!(target_url = label, attempts = attempt, "Succeeded after retry");
                }
                return AttemptOutcome::Succeeded { attempts: attempt };
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    target_url = label,
                    error = %e,
                    delay_ms = policy.delay.as_millis() as u64,
                    "Error downloading. Retrying {}/{}...",
                    attempt,
                    max_attempts
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => {
                error!(
                    target_url = label,
                    error = %e,
                    "Failed after {} attempts",
                    attempt
                );
                return AttemptOutcome::Exhausted {
                    attempts: attempt,
                    last_error: e,
                };
            }
        }
    }
}
