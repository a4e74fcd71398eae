use std::future::Future;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// OpContext carries cancellation and an optional deadline into every store and oracle call.
///
/// Cloning shares the cancellation token, so cancelling any clone cancels the operations running
/// under all of them.
#[derive(Clone, Debug, Default)]
pub struct OpContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ContextError {
    #[error("{op}: operation cancelled")]
    Cancelled { op: &'static str },
    #[error("{op}: deadline exceeded")]
    DeadlineExceeded { op: &'static str },
}

impl OpContext {
    pub fn background() -> Self {
        Self::default()
    }

    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::background().with_deadline(deadline),
            None => Self::background(),
        }
    }

    /// Keeps the earlier of the current and the new deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// `run()` drives `fut` to completion unless the context is cancelled or its deadline passes
    /// first, in which case `fut` is dropped and the matching `ContextError` is returned.
    pub async fn run<F, T, E>(&self, op: &'static str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<ContextError>,
    {
        if self.cancel.is_cancelled() {
            return Err(ContextError::Cancelled { op }.into());
        }

        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => futures::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = fut => result,
            _ = self.cancel.cancelled() => Err(ContextError::Cancelled { op }.into()),
            _ = expired => Err(ContextError::DeadlineExceeded { op }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn completes_without_deadline() {
        let ctx = OpContext::background();
        let result: Result<u32, ContextError> = ctx.run("noop", async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn deadline_aborts_slow_future() {
        let ctx = OpContext::with_timeout(Duration::from_millis(20));
        let result: Result<(), ContextError> = ctx
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(ContextError::DeadlineExceeded { op: "slow" }));
    }

    #[tokio::test]
    async fn cancel_from_clone_aborts_in_flight_future() {
        let ctx = OpContext::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result: Result<(), ContextError> = ctx
            .run("blocked", futures::future::pending::<Result<(), ContextError>>())
            .await;
        assert_eq!(result, Err(ContextError::Cancelled { op: "blocked" }));
    }

    #[tokio::test]
    async fn already_cancelled_context_never_polls() {
        let polled = AtomicBool::new(false);
        let ctx = OpContext::background();
        ctx.cancel();
        let result: Result<(), ContextError> = ctx
            .run("skipped", async {
                polled.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert_eq!(result, Err(ContextError::Cancelled { op: "skipped" }));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[test]
    fn huge_timeout_means_no_deadline() {
        let ctx = OpContext::with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ctx.deadline(), None);

        let ctx = OpContext::with_timeout(Duration::from_secs(5));
        assert!(ctx.deadline().is_some());
    }

    #[test]
    fn earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = OpContext::background()
            .with_deadline(now + Duration::from_secs(5))
            .with_deadline(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(5)));
    }
}
