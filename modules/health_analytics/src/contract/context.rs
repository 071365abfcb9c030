use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-call cancellation scope.
///
/// Callers hand one to every repository, aggregator and client operation. The
/// operation stops waiting once the token is cancelled or the deadline passes.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

/// Why [`CallContext::run`] gave up on a future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Cancelled,
    DeadlineExceeded,
}

impl CallContext {
    /// A context that never cancels on its own.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Drive `fut` to completion unless the context fires first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        if self.cancel.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
                _ = tokio::time::sleep_until(deadline) => Err(Interrupted::DeadlineExceeded),
                out = fut => Ok(out),
            },
            None => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
                out = fut => Ok(out),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let ctx = CallContext::background();
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn pre_cancelled_context_short_circuits() {
        let ctx = CallContext::background();
        ctx.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.run(async { 7 }).await, Err(Interrupted::Cancelled));
    }

    #[tokio::test]
    async fn deadline_interrupts_slow_future() {
        let ctx = CallContext::with_timeout(Duration::from_millis(20));
        let slow = tokio::time::sleep(Duration::from_secs(10));
        assert_eq!(ctx.run(slow).await, Err(Interrupted::DeadlineExceeded));
    }

    #[tokio::test]
    async fn token_cancellation_interrupts_pending_future() {
        let ctx = CallContext::background();
        let handle = ctx.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            handle.cancel();
        });
        let pending = futures::future::pending::<()>();
        assert_eq!(ctx.run(pending).await, Err(Interrupted::Cancelled));
    }
}
