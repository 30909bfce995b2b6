use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded, fixed-interval retry used for startup-time registry work.
///
/// Both bounds are explicit: an unbounded loop here would hang process
/// startup forever when a peer or the registry never comes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Runs `op` until it succeeds or `max_attempts` is reached, sleeping
    /// `backoff` between attempts. Returns the last error on exhaustion.
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= max_attempts => {
                    tracing::warn!("{} failed after {} attempts: {}", what, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("{} failed (attempt {}/{}): {}", what, attempt, max_attempts, e);
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }
}
