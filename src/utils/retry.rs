//! Retry utilities with exponential backoff for catalog requests.

use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::sources::CatalogError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum total time to spend on retries (including delays)
    pub max_total_time: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            max_total_time: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Backoff delay before the attempt following `attempt` (1-based)
    fn backoff(&self, attempt: u32) -> Duration {
        let exp_delay = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powf(attempt.saturating_sub(1) as f64);
        Duration::from_secs_f64(exp_delay.min(self.max_delay.as_secs_f64()))
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, PartialEq)]
pub enum TransientError {
    /// Network connectivity issues
    Network,
    /// Rate limit exceeded
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Request timeout
    Timeout,
}

impl TransientError {
    /// Check if a CatalogError represents a transient error
    pub fn from_catalog_error(err: &CatalogError) -> Option<Self> {
        match err {
            CatalogError::RateLimit => Some(TransientError::RateLimit),
            CatalogError::Network(msg) if msg.to_lowercase().contains("timed out") => {
                Some(TransientError::Timeout)
            }
            CatalogError::Network(_) => Some(TransientError::Network),
            CatalogError::Api(msg) => {
                let msg_lower = msg.to_lowercase();
                if msg_lower.contains("status: 5") {
                    Some(TransientError::ServerError)
                } else if msg_lower.contains("timeout") {
                    Some(TransientError::Timeout)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Minimum delay recommended for this error
    pub fn recommended_delay(&self) -> Duration {
        match self {
            TransientError::RateLimit => Duration::from_secs(5),
            TransientError::ServerError => Duration::from_secs(1),
            TransientError::Timeout | TransientError::Network => Duration::ZERO,
        }
    }
}

/// Execute an async operation, retrying transient failures with backoff
///
/// Permanent errors are returned immediately; the last transient error is
/// returned once `max_attempts` or `max_total_time` is exhausted.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, CatalogError>>,
{
    let mut attempts = 0;
    let mut total_elapsed = Duration::ZERO;

    loop {
        attempts += 1;

        let error = match timeout(config.max_total_time, operation()).await {
            Ok(Ok(result)) => {
                if attempts > 1 {
                    tracing::info!(
                        "Request succeeded on attempt {} after {} transient failures",
                        attempts,
                        attempts - 1
                    );
                }
                return Ok(result);
            }
            Ok(Err(error)) => error,
            Err(_) => CatalogError::Network("Operation timed out".to_string()),
        };

        let Some(transient) = TransientError::from_catalog_error(&error) else {
            return Err(error);
        };

        let delay = std::cmp::max(config.backoff(attempts), transient.recommended_delay());
        total_elapsed += delay;

        if attempts >= config.max_attempts || total_elapsed >= config.max_total_time {
            tracing::warn!(
                "Request failed after {} attempts (total backoff: {:?}): {}",
                attempts,
                total_elapsed,
                error
            );
            return Err(error);
        }

        tracing::debug!(
            "Transient error on attempt {}: {:?}, retrying in {:?}",
            attempts,
            transient,
            delay
        );
        sleep(delay).await;
    }
}

/// Retry configuration for the BookOutlet storefront
pub fn catalog_retry_config() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(8),
        backoff_multiplier: 2.0,
        max_total_time: Duration::from_secs(45),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
            max_total_time: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_retry_success_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry(fast_config(3), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CatalogError>("success")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry(fast_config(4), move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(CatalogError::Network("connection reset".to_string()))
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = with_retry(fast_config(2), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CatalogError::Network("unreachable".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(CatalogError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_returns_permanent_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = with_retry(fast_config(5), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CatalogError::Parse("not html".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(CatalogError::Parse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transient_error_detection() {
        assert_eq!(
            TransientError::from_catalog_error(&CatalogError::RateLimit),
            Some(TransientError::RateLimit)
        );
        assert_eq!(
            TransientError::from_catalog_error(&CatalogError::Network("refused".to_string())),
            Some(TransientError::Network)
        );
        assert_eq!(
            TransientError::from_catalog_error(&CatalogError::Api(
                "BookOutlet returned status: 503 Service Unavailable".to_string()
            )),
            Some(TransientError::ServerError)
        );
        assert_eq!(
            TransientError::from_catalog_error(&CatalogError::Api(
                "BookOutlet returned status: 404 Not Found".to_string()
            )),
            None
        );
        assert!(TransientError::from_catalog_error(&CatalogError::Parse("bad".to_string())).is_none());
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = fast_config(10);
        assert_eq!(config.backoff(1), Duration::from_millis(5));
        assert_eq!(config.backoff(2), Duration::from_millis(10));
        assert_eq!(config.backoff(6), Duration::from_millis(20));
    }
}
