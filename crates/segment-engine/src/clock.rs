use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use std::time::{Duration, Instant};

/// Timestamp granularity of generated events.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Coarse event clock.
///
/// `now` only moves in whole tick intervals, and only when [`Clock::maybe_advance`]
/// observes that at least one interval has passed since the last tick boundary.
/// Every event generated between two boundaries carries the same timestamp.
#[derive(Clone, Debug)]
pub struct Clock {
    now: DateTime<Utc>,
    last_tick: Instant,
    interval: Duration,
}

impl Clock {
    /// Start at the current wall-clock time.
    pub fn new() -> Self {
        Self::starting_at(Utc::now(), Instant::now())
    }

    /// Start at `now`, treating `at` as the first tick boundary.
    pub fn starting_at(now: DateTime<Utc>, at: Instant) -> Self {
        Self {
            now,
            last_tick: at,
            interval: TICK_INTERVAL,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Non-blocking poll against the monotonic clock.
    pub fn maybe_advance(&mut self) -> bool {
        self.maybe_advance_at(Instant::now())
    }

    /// Advance to the newest tick boundary at or before `at`. Returns whether `now` moved.
    ///
    /// Instants earlier than the last boundary are ignored.
    pub fn maybe_advance_at(&mut self, at: Instant) -> bool {
        let elapsed = at.saturating_duration_since(self.last_tick);
        if elapsed < self.interval {
            return false;
        }

        let ticks = elapsed.as_nanos() / self.interval.as_nanos();
        let step = self
            .interval
            .saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX));
        self.last_tick += step;
        if let Ok(delta) = TimeDelta::from_std(step) {
            self.now = self.now.checked_add_signed(delta).unwrap_or(self.now);
        }
        true
    }

    /// RFC3339 with whole seconds, e.g. `2026-10-14T12:00:00Z`.
    pub fn timestamp(&self) -> String {
        format_timestamp(&self.now)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_timestamp(now: &DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}
