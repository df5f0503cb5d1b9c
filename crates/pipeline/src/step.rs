//! Per-step retry runtime.
//!
//! Each event handler is a fixed sequence of named steps. A step that
//! fails transiently (network, timeout, pool exhaustion) is retried up to
//! [`MAX_RETRIES`] times with a short backoff; a step that determines its
//! target entity does not exist fails non-retriably and aborts the
//! remaining steps for that event. Steps must be idempotent: re-applying
//! an assignment or re-setting a field to the same value cannot corrupt
//! state, so an at-least-once runtime is safe.

use std::future::Future;
use std::time::Duration;

/// Additional attempts after the first failure.
pub const MAX_RETRIES: usize = 2;

/// Backoff before each retry.
const RETRY_DELAYS: [Duration; MAX_RETRIES] =
    [Duration::from_millis(100), Duration::from_millis(400)];

/// Error type for pipeline steps.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The step can never succeed (entity missing); abort the event.
    #[error("{0}")]
    NonRetriable(String),

    /// Infrastructure hiccup; worth retrying.
    #[error("{0}")]
    Transient(String),
}

impl StepError {
    /// Non-retriable failure from anything displayable.
    pub fn non_retriable(msg: impl std::fmt::Display) -> Self {
        Self::NonRetriable(msg.to_string())
    }

    /// Transient failure from anything displayable.
    pub fn transient(msg: impl std::fmt::Display) -> Self {
        Self::Transient(msg.to_string())
    }
}

/// Run a step with the standard retry policy.
///
/// The closure is invoked once per attempt; it must capture only state
/// that is safe to reuse across attempts.
pub async fn run_step<T, F, Fut>(name: &str, f: F) -> Result<T, StepError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, StepError>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(StepError::NonRetriable(msg)) => {
                tracing::error!(step = name, error = %msg, "Step failed, not retrying");
                return Err(StepError::NonRetriable(msg));
            }
            Err(StepError::Transient(msg)) if attempt < MAX_RETRIES => {
                tracing::warn!(
                    step = name,
                    attempt = attempt + 1,
                    error = %msg,
                    "Step failed, retrying"
                );
                tokio::time::sleep(RETRY_DELAYS[attempt]).await;
                attempt += 1;
            }
            Err(StepError::Transient(msg)) => {
                tracing::error!(step = name, error = %msg, "Step failed after all retries");
                return Err(StepError::Transient(msg));
            }
        }
    }
}

/// Run a best-effort step: failures (after retries) are logged and
/// swallowed so sibling steps still execute.
pub async fn run_step_best_effort<F, Fut>(name: &str, f: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), StepError>>,
{
    if let Err(e) = run_step(name, f).await {
        tracing::warn!(step = name, error = %e, "Best-effort step abandoned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn success_on_first_attempt_runs_once() {
        let calls = AtomicUsize::new(0);
        let result = run_step("ok", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, StepError>(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_to_success() {
        let calls = AtomicUsize::new(0);
        let result = run_step("flaky", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(StepError::transient("connection reset"))
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = run_step("down", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StepError::transient("still down"))
        })
        .await;
        assert!(matches!(result, Err(StepError::Transient(_))));
        // First attempt plus MAX_RETRIES retries.
        assert_eq!(calls.load(Ordering::SeqCst), 1 + MAX_RETRIES);
    }

    #[tokio::test]
    async fn non_retriable_failure_runs_exactly_once() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = run_step("missing", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StepError::non_retriable("ticket 9 not found"))
        })
        .await;
        assert!(matches!(result, Err(StepError::NonRetriable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn best_effort_step_swallows_exhausted_failures() {
        let calls = AtomicUsize::new(0);
        run_step_best_effort("mail", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StepError::transient("smtp refused"))
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1 + MAX_RETRIES);
    }
}
