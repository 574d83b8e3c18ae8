use crate::config::ConnectorState;
use crate::error::ConnectorError;
use crate::protocol::Encoder;
use segment_engine::{Engine, RateLimiter, CHECKPOINT_INTERVAL};
use std::io::Write;
use tokio_util::sync::CancellationToken;

/// Drives the engine: generate, emit, maybe checkpoint, wait for the next slot.
pub struct Reader<W: Write> {
    engine: Engine,
    out: Encoder<W>,
    events: RateLimiter,
    checkpoints: RateLimiter,
    state: ConnectorState,
    tail: bool,
}

impl<W: Write> Reader<W> {
    pub fn new(
        engine: Engine,
        out: W,
        events_per_second: u32,
        state: ConnectorState,
        tail: bool,
    ) -> Self {
        Self {
            engine,
            out: Encoder::new(out),
            events: RateLimiter::per_second(events_per_second),
            checkpoints: RateLimiter::every(CHECKPOINT_INTERVAL),
            state,
            tail,
        }
    }

    /// Run until the catalog is not tailing (one event), `shutdown` fires, or a
    /// write fails.
    ///
    /// Cancellation interrupts the throttle wait and writes a final checkpoint.
    pub async fn run(
        &mut self,
        shutdown: &CancellationToken,
    ) -> Result<ConnectorState, ConnectorError> {
        loop {
            let event = self.engine.next();
            self.out.record(&event)?;
            self.state.advance_cursor();

            if self.checkpoints.is_ready() {
                self.out.state(&self.state)?;
                tracing::debug!(cursor = self.state.cursor, "checkpoint");
            }

            tokio::select! {
                _ = self.events.wait() => {}
                _ = shutdown.cancelled() => {
                    self.out.state(&self.state)?;
                    tracing::info!(cursor = self.state.cursor, "read interrupted, final checkpoint written");
                    return Ok(self.state);
                }
            }

            if !self.tail {
                return Ok(self.state);
            }
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::time::Duration;
    use tokio::time::Instant;

    fn engine() -> Engine {
        Engine::new(1000, 10_000, Some(8675309)).unwrap()
    }

    fn messages(buf: Vec<u8>) -> Vec<Value> {
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_emits_record_then_checkpoint() {
        let mut reader = Reader::new(engine(), Vec::new(), 10, ConnectorState::default(), false);
        let state = reader.run(&CancellationToken::new()).await.unwrap();
        assert_eq!(state.cursor, 1);

        let msgs = messages(reader.into_inner());
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0]["type"], "RECORD");
        assert_eq!(msgs[1]["type"], "STATE");
        assert_eq!(msgs[1]["state"]["data"]["cursor"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resumes_from_cursor() {
        let resumed = ConnectorState { cursor: 41 };
        let mut reader = Reader::new(engine(), Vec::new(), 10, resumed, false);
        let state = reader.run(&CancellationToken::new()).await.unwrap();
        assert_eq!(state.cursor, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn tailing_respects_rate_and_stops_on_shutdown() {
        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10_100)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let mut reader = Reader::new(engine(), Vec::new(), 5, ConnectorState::default(), true);
        let state = reader.run(&shutdown).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(10_000));

        // The first wait is free, so two events go out at t = 0, then one
        // per 200ms up to t = 10.0s.
        assert_eq!(state.cursor, 52);

        let msgs = messages(reader.into_inner());
        let records = msgs.iter().filter(|m| m["type"] == "RECORD").count();
        assert_eq!(records as u64, state.cursor);

        let last = msgs.last().unwrap();
        assert_eq!(last["type"], "STATE");
        assert_eq!(last["state"]["data"]["cursor"], 52);
    }

    #[tokio::test(start_paused = true)]
    async fn fifty_events_need_more_than_nine_and_a_half_seconds() {
        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(9_500)).await;
            trigger.cancel();
        });

        let mut reader = Reader::new(engine(), Vec::new(), 5, ConnectorState::default(), true);
        let state = reader.run(&shutdown).await.unwrap();
        assert!(state.cursor < 50, "cursor={}", state.cursor);
    }

    #[tokio::test(start_paused = true)]
    async fn checkpoints_are_throttled() {
        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1_055)).await;
            trigger.cancel();
        });

        // 100 events/s for ~1s, but at most one checkpoint per 200ms.
        let mut reader = Reader::new(engine(), Vec::new(), 100, ConnectorState::default(), true);
        let state = reader.run(&shutdown).await.unwrap();
        assert!(state.cursor >= 100);

        let msgs = messages(reader.into_inner());
        let states: Vec<u64> = msgs
            .iter()
            .filter(|m| m["type"] == "STATE")
            .map(|m| m["state"]["data"]["cursor"].as_u64().unwrap())
            .collect();
        // 0, 0.2, ..., 1.0s plus the final checkpoint on shutdown.
        assert!(states.len() <= 7, "{states:?}");
        assert!(states.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*states.last().unwrap(), state.cursor);
    }
}
