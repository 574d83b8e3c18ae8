use std::time::Duration;
use tokio::time::Instant;

/// Cadence of state checkpoints, independent of event rate.
pub const CHECKPOINT_INTERVAL: Duration = Duration::from_millis(200);

/// Token bucket with a capacity of one token.
///
/// The bucket starts full, so the first `wait` or `is_ready` succeeds
/// immediately; afterwards one token is refilled every `interval`.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_ready: Instant,
}

impl RateLimiter {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            next_ready: Instant::now(),
        }
    }

    /// Limit to `max_per_second` tokens per second; zero is treated as one.
    pub fn per_second(max_per_second: u32) -> Self {
        Self::every(Duration::from_secs(1) / max_per_second.max(1))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Suspend until a token is available, then take it.
    ///
    /// Dropping the future before it completes leaves the token in place.
    pub async fn wait(&mut self) {
        let now = Instant::now();
        if self.next_ready > now {
            tokio::time::sleep_until(self.next_ready).await;
        }
        self.next_ready = self.next_ready.max(now) + self.interval;
    }

    /// Take the token if one is available, without waiting.
    pub fn is_ready(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.next_ready {
            self.next_ready = now + self.interval;
            true
        } else {
            false
        }
    }
}
