use std::time::Duration;

/// Suspends the current run, e.g. between pages or before a retry.
#[async_trait::async_trait]
pub trait Pause: Send + Sync {
    /// Suspend for exactly `duration`
    async fn sleep(&self, duration: Duration);

    /// Suspend for `duration`, skipping zero-length waits
    async fn pause(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        tracing::trace!(
            delay_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "pausing"
        );
        self.sleep(duration).await;
    }

    /// [`pause`](Self::pause) for a millisecond count
    async fn pause_ms(&self, millis: u64) {
        self.pause(Duration::from_millis(millis)).await;
    }
}

/// Real wall-clock pauses on the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait::async_trait]
impl Pause for TokioPause {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
