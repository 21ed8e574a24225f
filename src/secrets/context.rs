//! Cancellable, deadline-bearing operation context.
//!
//! Every key-vault call takes an [`OperationContext`]. The facade forwards it
//! unchanged; adapters wrap their network round trip in [`OperationContext::run`]
//! so that an in-flight call stops as soon as the context is cancelled or its
//! deadline passes.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{BoxError, ContextError};

/// Cancellation and deadline scope for a single operation.
///
/// Cloning is cheap; clones share the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OperationContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context driven by an existing cancellation token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self { token, deadline: None }
    }

    /// Derive a child context that also expires after `timeout`.
    ///
    /// The child is cancelled when the parent is; cancelling the child leaves
    /// the parent untouched. The earlier of the two deadlines wins.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child context that expires at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self { token: self.token.child_token(), deadline: Some(deadline) }
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason this context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            Some(ContextError::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(ContextError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Drive `operation` to completion unless the context ends first.
    ///
    /// A context that is already done fails immediately without polling
    /// `operation`.
    pub async fn run<T, F>(&self, operation: F) -> Result<T, BoxError>
    where
        F: Future<Output = Result<T, BoxError>>,
    {
        if let Some(err) = self.err() {
            return Err(Box::new(err));
        }

        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Box::new(ContextError::Cancelled) as BoxError),
            _ = expired => Err(Box::new(ContextError::DeadlineExceeded) as BoxError),
            result = operation => result,
        }
    }
}
