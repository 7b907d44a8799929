//! Pending results of suspending candidates.
//!
//! When the selected candidate is asynchronous, `dispatch` spawns its future
//! on a Tokio runtime and hands back a [`PendingResult`] without waiting. The
//! caller owns the handle: await it, poll it for completion, or abort it. The
//! engine applies no timeout or cancellation of its own.

use overcast_core::{BoxError, Value};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use thiserror::Error;
use tokio::{runtime::Handle, task::JoinHandle};

/// Errors surfaced when resolving a [`PendingResult`].
#[derive(Error, Debug)]
pub enum PendingError {
    /// The candidate's future returned an error.
    #[error(transparent)]
    Raised(BoxError),

    /// The task was aborted before it completed.
    #[error("pending result was cancelled")]
    Cancelled,

    /// The candidate's future panicked.
    #[error("candidate panicked: {0}")]
    Panicked(String),
}

impl PendingError {
    /// Returns the candidate's own error, if it raised one.
    pub fn into_raised(self) -> Option<BoxError> {
        match self {
            PendingError::Raised(err) => Some(err),
            _ => None,
        }
    }
}

/// A caller-owned handle to a scheduled suspending candidate.
///
/// Awaiting it yields the candidate's own return value.
pub struct PendingResult {
    operation: String,
    handle: JoinHandle<Result<Value, BoxError>>,
}

impl PendingResult {
    pub(crate) fn spawn<F>(runtime: &Handle, operation: String, future: F) -> Self
    where
        F: Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        Self {
            operation,
            handle: runtime.spawn(future),
        }
    }

    /// Qualified name of the dispatched operation.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns `true` once the task has completed, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task. Awaiting afterwards yields [`PendingError::Cancelled`]
    /// unless it already completed.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Future for PendingResult {
    type Output = Result<Value, PendingError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(PendingError::Raised(err)),
            Err(err) if err.is_cancelled() => Err(PendingError::Cancelled),
            Err(err) => Err(PendingError::Panicked(panic_message(err))),
        })
    }
}

impl std::fmt::Debug for PendingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingResult")
            .field("operation", &self.operation)
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn panic_message(err: tokio::task::JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string()),
        Err(err) => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolves_to_candidate_value() {
        let pending = PendingResult::spawn(&Handle::current(), "op".into(), async {
            Ok::<_, BoxError>(Value::new(5_u32))
        });
        let value = pending.await.unwrap();
        assert_eq!(value.downcast_ref::<u32>(), Some(&5));
    }

    #[tokio::test]
    async fn test_raised_error_is_passed_through() {
        let pending = PendingResult::spawn(&Handle::current(), "op".into(), async {
            Err::<Value, BoxError>("boom".into())
        });
        let err = pending.await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(err.into_raised().is_some());
    }

    #[tokio::test]
    async fn test_abort() {
        let pending = PendingResult::spawn(&Handle::current(), "op".into(), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, BoxError>(Value::unit())
        });
        pending.abort();
        assert!(matches!(pending.await, Err(PendingError::Cancelled)));
    }

    #[tokio::test]
    async fn test_panic_is_reported() {
        let pending = PendingResult::spawn(&Handle::current(), "op".into(), async {
            if true {
                panic!("candidate blew up");
            }
            Ok::<_, BoxError>(Value::unit())
        });
        match pending.await {
            Err(PendingError::Panicked(message)) => assert_eq!(message, "candidate blew up"),
            other => panic!("expected a panic, got {other:?}"),
        }
    }
}
