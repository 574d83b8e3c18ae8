//! Synthetic "user joined/left segment" event synthesis.
//!
//! [`Engine`] draws segments from a Zipfian distribution, users from a clipped
//! half-normal and add/remove with a fixed bias, replays a share of past
//! samples from a bounded [`RepetitionBuffer`], and stamps each event with a
//! UUID-shaped id and a one-second quantized timestamp. [`RateLimiter`]
//! paces the loop that pulls events out of the engine.

pub mod clock;
pub mod engine;
pub mod error;
pub mod event;
pub mod identity;
pub mod repetition;
pub mod sample;
pub mod sampler;
pub mod throttle;

pub use clock::Clock;
pub use engine::{Engine, Tuning};
pub use error::ConfigError;
pub use event::{Event, Segment};
pub use identity::EventId;
pub use repetition::{RepetitionBuffer, RepetitionStats};
pub use sample::Sample;
pub use throttle::{RateLimiter, CHECKPOINT_INTERVAL};
