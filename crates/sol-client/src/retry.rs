//! Retry policy: failure classification plus bounded exponential backoff.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::error::ClientError;

/// Substrings that mark an error as permanently failed. Checked before the
/// retryable table so `insufficient funds` wins over the fee rule below.
const FATAL_SIGNALS: &[&str] = &[
    "invalid",
    "signature verification failed",
    "account does not exist",
    "insufficient funds",
    "transaction simulation failed",
];

/// Substrings that mark an error as transient.
const RETRYABLE_SIGNALS: &[&str] = &[
    "timeout",
    "connection",
    "network",
    "blockhash not found",
    "node is behind",
    "too many requests",
    "rate limit",
];

/// How an error should be handled by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Retryable,
    Fatal,
}

/// Backoff parameters. Delay for attempt `n` (0-based) is
/// `min(initial_delay_ms << n, max_delay_ms)`.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryConfig {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay_ms
            .saturating_mul(1u64 << attempt.min(32))
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Classify an error by case-insensitive substring match on its message.
///
/// Cancellation and ledger-reported rejections are always fatal; everything
/// unmatched defaults to fatal so unknown failures never loop.
pub fn classify(error: &ClientError) -> Classification {
    match error {
        ClientError::Cancelled | ClientError::TransactionRejected(_) => {
            return Classification::Fatal
        }
        _ => {}
    }

    let message = error.to_string().to_lowercase();
    if FATAL_SIGNALS.iter().any(|s| message.contains(s)) {
        return Classification::Fatal;
    }
    if RETRYABLE_SIGNALS.iter().any(|s| message.contains(s)) {
        return Classification::Retryable;
    }
    // A fee shortfall is transient (fee markets move); a funds shortfall
    // above is not.
    if message.contains("insufficient") && message.contains("fee") {
        return Classification::Retryable;
    }
    Classification::Fatal
}

/// Run `operation` under the retry policy.
///
/// Success returns immediately. A retryable failure sleeps the backoff delay
/// and tries again while attempts remain; a fatal failure, or exhausting the
/// attempt budget, surfaces the last error.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    what: &str,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let last_attempt = attempt + 1 >= config.max_attempts.max(1);
                match classify(&error) {
                    Classification::Fatal => {
                        debug!("{what}: fatal error, not retrying: {error}");
                        return Err(error);
                    }
                    Classification::Retryable if last_attempt => {
                        warn!("{what}: giving up after {} attempts: {error}", attempt + 1);
                        return Err(error);
                    }
                    Classification::Retryable => {
                        let delay = config.delay_for_attempt(attempt);
                        warn!(
                            "{what}: attempt {} failed ({error}), retrying in {:?}",
                            attempt + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        }
    }
}
