use crate::pacing::Pause;
use std::fmt::Display;
use std::future::Future;
use storefront_core::RetryPolicy;

/// Run `operation` until it succeeds or the retry budget is spent.
///
/// The closure receives the 1-based attempt number. Before retry `n` the
/// executor pauses for `policy.delay_for(n)`. After the last retry fails its
/// error is returned unchanged.
pub async fn retry_with_backoff<T, E, P, F, Fut>(
    policy: &RetryPolicy,
    pause: &P,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    P: Pause + ?Sized,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_retries.saturating_add(1);
    let mut retry = 0;

    loop {
        let attempt = retry + 1;
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "attempt failed: {}, retrying",
                    e
                );
                pause.pause(delay).await;
            }
            Err(e) => {
                tracing::error!(attempt, "giving up after {} attempts: {}", attempt, e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Duration>>);

    #[async_trait::async_trait]
    impl Pause for Recorder {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay_ms: 3_000,
            backoff_factor: 2.0,
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_two_failures() {
        let recorder = Recorder::default();
        let calls = AtomicU32::new(0);

        let result: Result<&str, String> = retry_with_backoff(&policy(3), &recorder, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(format!("attempt {attempt} failed"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![Duration::from_secs(3), Duration::from_secs(6)]
        );
    }

    #[tokio::test]
    async fn test_last_error_is_returned() {
        let recorder = Recorder::default();

        let result: Result<(), String> =
            retry_with_backoff(&policy(2), &recorder, |attempt| async move {
                Err(format!("failure {attempt}"))
            })
            .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(recorder.0.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_runs_once() {
        let recorder = Recorder::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), &str> = retry_with_backoff(&policy(0), &recorder, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("boom") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(recorder.0.lock().unwrap().is_empty());
    }
}
