use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Interrupted;

/// Runtime context for a single call
///
/// Shared by the client stub, the service router and the backend adapters.
/// Every blocking step of a call is raced against the deadline and the
/// cancellation token held here.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl CallContext {
    /// Context with no deadline and a fresh cancellation token
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline_at(Instant::now() + timeout)
    }

    /// Set an absolute deadline
    #[must_use]
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Replace the cancellation token
    #[must_use]
    pub fn cancelled_by(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Derive a context bounded by both this deadline and `timeout`
    ///
    /// The child is cancelled whenever the parent is.
    #[must_use]
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let limit = timeout.map(|t| Instant::now() + t);
        let deadline = match (self.deadline, limit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        Self {
            deadline,
            cancellation: self.cancellation.child_token(),
        }
    }

    /// Absolute deadline, if any
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, if any
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Cancellation token for this call
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Whether the call has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Drive `future` until it completes, the deadline passes, or the call is cancelled
    ///
    /// On interruption the future is dropped, which aborts any in-flight I/O
    /// it owns.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] when the deadline passes or the token is cancelled first
    pub async fn run<F>(&self, future: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(Interrupted::Cancelled),
            output = future => Ok(output),
            () = expiry => Err(Interrupted::DeadlineExceeded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_without_deadline() {
        let ctx = CallContext::new();
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
        assert!(ctx.remaining().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_interrupts_pending_future() {
        let ctx = CallContext::with_timeout(Duration::from_secs(2));
        let result = ctx.run(std::future::pending::<()>()).await;
        assert_eq!(result, Err(Interrupted::DeadlineExceeded));
    }

    #[tokio::test]
    async fn cancellation_wins_over_pending_future() {
        let token = CancellationToken::new();
        let ctx = CallContext::new().cancelled_by(token.clone());
        token.cancel();

        let result = ctx.run(std::future::pending::<()>()).await;
        assert_eq!(result, Err(Interrupted::Cancelled));
        assert!(ctx.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn child_takes_the_tighter_deadline() {
        let parent = CallContext::with_timeout(Duration::from_secs(30));
        let child = parent.child(Some(Duration::from_secs(5)));
        assert!(child.remaining().unwrap() <= Duration::from_secs(5));

        let unbounded = CallContext::new().child(None);
        assert!(unbounded.deadline().is_none());
    }

    #[tokio::test]
    async fn cancelling_parent_cancels_child() {
        let parent = CallContext::new();
        let child = parent.child(Some(Duration::from_secs(1)));
        parent.cancellation().cancel();
        assert!(child.is_cancelled());
    }
}
