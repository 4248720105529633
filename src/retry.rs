//! Bounded retry for transient platform failures
//!
//! Profile mutations can fail while another operation holds the target
//! cluster's lock. This module retries only errors matching a configured set
//! of transient signatures, a bounded number of times, sleeping a jittered
//! fixed interval between attempts. Any other error returns immediately.
//!
//! # Example
//!
//! ```ignore
//! use nimbus_lifecycle::retry::{retry_on_transient, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! retry_on_transient(&policy, "patch_profiles", || {
//!     client.patch_profiles(&cluster_uid, &request, &ctx)
//! })
//! .await?;
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{error, warn};

use crate::error::Error;

/// Message fragment identifying the platform's transient resource-lock error
///
/// The only expected transient condition is another mutation in flight
/// against the same target.
pub const TRANSIENT_LOCK_SIGNATURE: &str = "resource is locked";

/// Policy for operations that may fail transiently
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Transient failures tolerated before the last error is returned
    pub max_attempts: u32,
    /// Wait between attempts, jittered 0.5x-1.5x
    pub wait_time: Duration,
    /// Error-message fragments classified as transient
    pub retryable_signatures: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::DEFAULT_RETRY_ATTEMPTS,
            wait_time: crate::DEFAULT_RETRY_WAIT,
            retryable_signatures: vec![TRANSIENT_LOCK_SIGNATURE.to_string()],
        }
    }
}

impl RetryPolicy {
    /// Create a policy with a custom transient-failure budget
    pub fn with_max_attempts(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            ..Default::default()
        }
    }

    /// Classify an error as transient under this policy.
    ///
    /// Cancellation is never transient: retrying after the ambient context
    /// was cancelled is never correct, whatever the message text.
    pub fn is_transient(&self, err: &Error) -> bool {
        if err.is_cancelled() {
            return false;
        }
        let msg = err.to_string();
        self.retryable_signatures
            .iter()
            .any(|sig| msg.contains(sig.as_str()))
    }
}

/// Execute an async operation, retrying transient failures per the policy.
///
/// The operation must be idempotent: profile patches express a desired
/// binding set, not an incremental delta, so repeated application converges.
///
/// An operation that fails transiently exactly `max_attempts` times and then
/// succeeds still succeeds (at most `max_attempts + 1` invocations); one more
/// transient failure returns the last error. Non-transient errors return
/// after a single invocation.
pub async fn retry_on_transient<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, Error>>,
{
    let mut failures = 0u32;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !policy.is_transient(&e) => return Err(e),
            Err(e) => {
                failures += 1;
                if failures > policy.max_attempts {
                    error!(
                        operation = %operation_name,
                        failures = failures,
                        error = %e,
                        "transient failures exhausted retry budget"
                    );
                    return Err(e);
                }

                // Jitter prevents simultaneous retries from colliding on the
                // same lock again.
                let jitter = rand::thread_rng().gen_range(0.5..1.5);
                let delay = Duration::from_secs_f64(policy.wait_time.as_secs_f64() * jitter);

                warn!(
                    operation = %operation_name,
                    failures = failures,
                    error = %e,
                    delay_ms = delay.as_millis(),
                    "transient failure, retrying"
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            wait_time: Duration::from_millis(1),
            ..Default::default()
        }
    }

    fn locked_error() -> Error {
        Error::api(423, "resource is locked by another operation")
    }

    #[test]
    fn classifies_lock_signature_as_transient() {
        let policy = RetryPolicy::default();
        assert!(policy.is_transient(&locked_error()));
        assert!(!policy.is_transient(&Error::api(400, "validation failed")));
        assert!(!policy.is_transient(&Error::not_found("cluster 'c1'")));
    }

    #[test]
    fn cancellation_is_never_transient() {
        let policy = RetryPolicy::default();
        // Even when the message text matches a configured signature
        let err = Error::cancelled("gave up while resource is locked");
        assert!(!policy.is_transient(&err));
    }

    #[test]
    fn custom_signatures_extend_classification() {
        let policy = RetryPolicy {
            retryable_signatures: vec![
                TRANSIENT_LOCK_SIGNATURE.to_string(),
                "too many requests".to_string(),
            ],
            ..Default::default()
        };
        assert!(policy.is_transient(&Error::api(429, "too many requests")));
    }

    #[tokio::test]
    async fn succeeds_immediately_without_retrying() {
        let result: Result<i32, Error> =
            retry_on_transient(&fast_policy(3), "op", || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn succeeds_at_the_retry_budget_boundary() {
        // Fails transiently exactly k times with max_attempts = k:
        // the k+1-th invocation succeeds.
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();

        let result = retry_on_transient(&fast_policy(2), "op", || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(locked_error())
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_budget_and_returns_last_error() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();

        let result: Result<i32, Error> = retry_on_transient(&fast_policy(1), "op", || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(locked_error())
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("resource is locked"));
        // One tolerated failure plus the final failing invocation
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_error_returns_after_one_invocation() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();

        let result: Result<i32, Error> = retry_on_transient(&fast_policy(3), "op", || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(Error::api(400, "validation failed"))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_returns_after_one_invocation() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();

        let result: Result<i32, Error> = retry_on_transient(&fast_policy(3), "op", || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(Error::cancelled("context deadline exceeded"))
            }
        })
        .await;

        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
