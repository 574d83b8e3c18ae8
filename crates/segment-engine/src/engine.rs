use crate::clock::Clock;
use crate::error::ConfigError;
use crate::event::{assemble, Event};
use crate::identity::EventId;
use crate::repetition::{RepetitionBuffer, RepetitionStats, DEFAULT_CAPACITY};
use crate::sample::Sample;
use crate::sampler::{check_probability, ActionSampler, SegmentSampler, UserSampler};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Distribution parameters of the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    /// Zipfian skew over segments. Must be > 1; larger values concentrate
    /// traffic on fewer segments.
    pub segment_skew: f64,
    /// Multiple of the standard deviation at which the user distribution is
    /// clipped. Larger values concentrate traffic on fewer users.
    pub user_clip: f64,
    pub add_probability: f32,
    /// Chance that an event replays a sample from the repetition buffer.
    pub repeat_probability: f32,
    pub repetition_capacity: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            segment_skew: 1.1,
            user_clip: 10.0,
            add_probability: 0.7,
            repeat_probability: 0.4,
            repetition_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Stochastic generator of segment membership events.
///
/// All randomness comes from one seeded RNG owned by the engine, so two
/// engines built with the same seed, cardinalities and tuning emit the same
/// sequence (timestamps aside, which follow the clock).
pub struct Engine {
    rng: ChaCha8Rng,
    seed: u64,
    segments: SegmentSampler,
    users: UserSampler,
    actions: ActionSampler,
    repeat_probability: f32,
    repetition: RepetitionBuffer,
    clock: Clock,
}

impl Engine {
    /// `seed` of `None` derives one from the current time.
    pub fn new(
        segment_cardinality: u64,
        user_cardinality: u64,
        seed: Option<i64>,
    ) -> Result<Self, ConfigError> {
        Self::with_tuning(segment_cardinality, user_cardinality, seed, Tuning::default())
    }

    pub fn with_tuning(
        segment_cardinality: u64,
        user_cardinality: u64,
        seed: Option<i64>,
        tuning: Tuning,
    ) -> Result<Self, ConfigError> {
        Self::with_clock(segment_cardinality, user_cardinality, seed, tuning, Clock::new())
    }

    pub fn with_clock(
        segment_cardinality: u64,
        user_cardinality: u64,
        seed: Option<i64>,
        tuning: Tuning,
        clock: Clock,
    ) -> Result<Self, ConfigError> {
        let segments = SegmentSampler::new(segment_cardinality, tuning.segment_skew)?;
        let users = UserSampler::new(user_cardinality, tuning.user_clip)?;
        let actions = ActionSampler::new(tuning.add_probability)?;
        check_probability("repeat_probability", tuning.repeat_probability)?;

        let seed = seed.map_or_else(time_seed, |s| s as u64);
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            segments,
            users,
            actions,
            repeat_probability: tuning.repeat_probability,
            repetition: RepetitionBuffer::new(tuning.repetition_capacity),
            clock,
        })
    }

    /// Seed the RNG was initialized with, including a time-derived one.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Produce the next event, polling the clock against the monotonic clock.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Event {
        self.next_at(Instant::now())
    }

    /// Produce the next event, polling the clock as if the current time were `at`.
    pub fn next_at(&mut self, at: Instant) -> Event {
        let sample = self.draw();
        let id = EventId::random(&mut self.rng);
        self.clock.maybe_advance_at(at);
        assemble(&sample, id, &self.clock.now())
    }

    /// Replay from the repetition buffer or draw fresh, then record the result.
    fn draw(&mut self) -> Sample {
        let sample = match self
            .repetition
            .maybe_repeat(self.repeat_probability, &mut self.rng)
        {
            Some(repeated) => repeated,
            None => Sample {
                segment: self.segments.sample(&mut self.rng),
                user: self.users.sample(&mut self.rng),
                add: self.actions.sample(&mut self.rng),
            },
        };
        self.repetition.insert(sample, &mut self.rng);
        sample
    }

    pub fn repetition_stats(&self) -> RepetitionStats {
        self.repetition.stats()
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}
