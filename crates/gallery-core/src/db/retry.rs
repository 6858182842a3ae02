//! Retry with exponential backoff for transient database errors.
//!
//! Only the warehouse refresh retries. Request handlers surface the first
//! failure to the client, whose error envelope tells it whether a retry may
//! help.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::DbError;
use crate::oracle;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Adds up to 25% random-ish jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Fail on the first error.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);

        let delay = if self.jitter {
            capped * (1.0 + jitter_fraction() * 0.25)
        } else {
            capped
        };

        Duration::from_millis(delay as u64)
    }
}

fn jitter_fraction() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos % 1000) as f64 / 1000.0
}

/// Determines if an error is transient and worth retrying.
///
/// Errors carrying an Oracle number follow the retryable flag of the
/// classification table.
pub fn is_transient_error(error: &DbError) -> bool {
    match error {
        DbError::Oracle { code, .. } => oracle::classify(*code).retryable,
        DbError::PoolExhausted => true,
        DbError::Connection(msg) => {
            let msg = msg.to_lowercase();
            msg.contains("timeout")
                || msg.contains("connection refused")
                || msg.contains("connection reset")
                || msg.contains("broken pipe")
                || msg.contains("temporarily unavailable")
        }
        DbError::Transaction(msg) | DbError::Query(msg) => {
            let msg = msg.to_lowercase();
            msg.contains("deadlock") || msg.contains("database is locked") || msg.contains("busy")
        }
        DbError::NotFound { .. }
        | DbError::Serialization(_)
        | DbError::Migration(_)
        | DbError::Configuration(_) => false,
    }
}

/// Runs `f` until it succeeds, fails with a non-transient error, or the
/// retry budget is spent.
///
/// ```ignore
/// let rows = with_retry(RetryConfig::default(), "load_fact_visits", || async {
///     repo.load_snapshot(&snapshot).await
/// })
/// .await?;
/// ```
pub async fn with_retry<F, Fut, T>(
    config: RetryConfig,
    operation_name: &str,
    f: F,
) -> Result<T, DbError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        operation = %operation_name,
                        attempt = attempt + 1,
                        "Database operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(e) if attempt < config.max_retries && is_transient_error(&e) => {
                let delay = config.calculate_delay(attempt);
                warn!(
                    operation = %operation_name,
                    attempt = attempt + 1,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient database error, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if attempt > 0 {
                    warn!(
                        operation = %operation_name,
                        attempts = attempt + 1,
                        error = %e,
                        "Database operation failed after retries"
                    );
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let config = RetryConfig {
            jitter: false,
            max_delay: Duration::from_millis(300),
            ..Default::default()
        };
        assert_eq!(config.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(config.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(config.calculate_delay(2), Duration::from_millis(300));
    }

    #[test]
    fn test_transient_follows_oracle_table() {
        assert!(is_transient_error(&DbError::oracle(60, "deadlock detected")));
        assert!(is_transient_error(&DbError::oracle(3113, "end-of-file")));
        assert!(!is_transient_error(&DbError::oracle(1, "unique constraint")));
        assert!(!is_transient_error(&DbError::oracle(2291, "parent key not found")));
        assert!(is_transient_error(&DbError::PoolExhausted));
        assert!(!is_transient_error(&DbError::NotFound {
            entity: "Artwork".into(),
            id: "1".into()
        }));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = with_retry(fast(), "load_dim_date", || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(DbError::oracle(8177, "cannot serialize access"))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = with_retry(fast(), "insert_fact", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(DbError::oracle(1, "unique constraint"))
            }
        })
        .await;

        assert!(matches!(result, Err(DbError::Oracle { code: 1, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = with_retry(fast(), "refresh", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(DbError::PoolExhausted)
            }
        })
        .await;

        assert!(matches!(result, Err(DbError::PoolExhausted)));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
