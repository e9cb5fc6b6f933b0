use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    configuration::{DelayRange, HttpSettings, PolitenessSettings},
    error::ScrapeError,
};

/// How many times to try a request and how long to wait before each try.
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base_ms: u64,
    backoff_max_ms: u64,
    request_jitter: DelayRange,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base_ms: u64, backoff_max_ms: u64, request_jitter: DelayRange) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            backoff_base_ms,
            backoff_max_ms,
            request_jitter,
        }
    }

    pub fn from_settings(http: &HttpSettings, politeness: &PolitenessSettings) -> Self {
        RetryPolicy::new(
            http.max_retries,
            politeness.retry_backoff_base_ms,
            politeness.retry_backoff_max_ms,
            politeness.request_jitter,
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `attempts_made` counts the attempt that just failed.
    pub fn should_retry(&self, attempts_made: u32, error: &ScrapeError) -> bool {
        attempts_made < self.max_attempts && error.is_retryable()
    }

    /// Doubles from the base on every retry, never past the cap.
    fn backoff(&self, retry: u32) -> Duration {
        let doubled = self
            .backoff_base_ms
            .saturating_mul(2u64.saturating_pow(retry.min(20)));
        Duration::from_millis(doubled.min(self.backoff_max_ms))
    }

    /// Every attempt waits the request jitter, retries add the backoff on top.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        match attempt {
            0 => self.request_jitter.sample(),
            n => self.request_jitter.sample() + self.backoff(n - 1),
        }
    }
}

/// Sleeps unless the token fires first.
pub async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<(), ScrapeError> {
    if cancel.is_cancelled() {
        return Err(ScrapeError::Cancelled);
    }
    if duration.is_zero() {
        return Ok(());
    }

    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(()),
        _ = cancel.cancelled() => Err(ScrapeError::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;

    fn timeout() -> ScrapeError {
        ScrapeError::FetchTimeout {
            url: "https://toranet.jp/job_detail/1".to_string(),
        }
    }

    #[test]
    fn retries_stop_at_max_attempts() {
        let policy = RetryPolicy::new(3, 0, 0, DelayRange::new(0, 0));

        assert!(policy.should_retry(1, &timeout()));
        assert!(policy.should_retry(2, &timeout()));
        assert!(!policy.should_retry(3, &timeout()));
        assert!(!policy.should_retry(1, &ScrapeError::InvalidUrl("x".to_string())));
    }

    #[test]
    fn retry_waits_double_up_to_the_cap() {
        let policy = RetryPolicy::new(6, 1000, 3000, DelayRange::new(100, 100));

        let waits: Vec<u128> = (0..5).map(|attempt| policy.delay_before(attempt).as_millis()).collect();
        assert_eq!(waits, vec![100, 1100, 2100, 3100, 3100]);
    }

    #[test]
    fn jitter_stays_within_its_range_on_retries() {
        let policy = RetryPolicy::new(3, 2000, 10_000, DelayRange::new(100, 500));

        for _ in 0..50 {
            let wait = policy.delay_before(2).as_millis();
            assert!((4100..=4500).contains(&wait), "{wait}");
        }
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let policy = RetryPolicy::new(0, 0, 0, DelayRange::new(0, 0));
        assert_eq!(policy.max_attempts(), 1);
    }

    #[tokio::test]
    async fn pause_honours_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = pause(std::time::Duration::from_secs(60), &cancel).await;
        assert!(matches!(result, Err(ScrapeError::Cancelled)));
    }
}
