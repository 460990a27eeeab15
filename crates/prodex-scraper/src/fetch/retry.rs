//! Bounded retry with exponential backoff for transient fetch errors.
//!
//! Non-transient errors (blocks, 4xx/5xx statuses, parse failures) are
//! propagated immediately without retrying — retrying a 403 from the same
//! address returns the same 403.

use std::future::Future;
use std::time::Duration;

use crate::error::ScrapeError;

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a transient error ([`ScrapeError::Network`] or [`ScrapeError::Timeout`])
/// the function sleeps for `backoff_base_ms * 2^attempt` milliseconds and
/// tries again, up to `max_retries` additional attempts after the first try.
/// If all retries are exhausted the last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        // Exponential backoff: base * 2^attempt ms, shift capped to avoid overflow.
        let delay_ms = backoff_base_ms.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %last_err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn timeout_err() -> ScrapeError {
        ScrapeError::Timeout {
            url: "https://example.com/p/1".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScrapeError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_on_timeout_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(2, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(timeout_err())
                } else {
                    Ok::<u32, ScrapeError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(1, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScrapeError>(timeout_err())
            }
        })
        .await;
        // max_retries=1 → 2 total attempts
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
        assert!(matches!(result, Err(ScrapeError::Timeout { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_blocked_error() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScrapeError>(ScrapeError::Blocked {
                    url: "https://example.com".to_owned(),
                    marker: "http 403".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScrapeError::Blocked { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_unexpected_status() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScrapeError>(ScrapeError::UnexpectedStatus {
                    status: 500,
                    url: "https://example.com".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScrapeError::UnexpectedStatus { .. })));
    }
}
