use std::future::Future;
use std::time::Duration;

/// Generic bounded retry with a fixed backoff between attempts (§7 recovery
/// policies: connection loss retries 3x with a 5s backoff). Calls `f` until
/// it returns `Some`, up to `attempts` times, sleeping `backoff` between
/// tries; never sleeps after the last attempt.
pub async fn retry_with_backoff<F, Fut, T>(attempts: usize, backoff: Duration, mut f: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let attempts = attempts.max(1);
    for attempt in 0..attempts {
        if let Some(value) = f().await {
            return Some(value);
        }
        if attempt + 1 < attempts {
            tokio::time::sleep(backoff).await;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn returns_first_success_without_exhausting_attempts() {
        let calls = AtomicUsize::new(0);
        let result = retry_with_backoff(3, Duration::from_millis(1), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(42)
        })
        .await;
        assert_eq!(result, Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_up_to_the_attempt_cap_then_gives_up() {
        let calls = AtomicUsize::new(0);
        let result: Option<()> = retry_with_backoff(3, Duration::from_millis(1), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            None
        })
        .await;
        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn succeeds_on_a_later_attempt() {
        let calls = AtomicUsize::new(0);
        let result = retry_with_backoff(3, Duration::from_millis(1), || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                None
            } else {
                Some(n)
            }
        })
        .await;
        assert_eq!(result, Some(2));
    }
}
