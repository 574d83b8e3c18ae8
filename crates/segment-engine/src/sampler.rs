use crate::error::ConfigError;
use rand::Rng;
use rand_distr::{StandardNormal, Zipf};

/// Wraps a Zipfian distribution over the segment universe.
pub struct SegmentSampler {
    dist: Zipf<f64>,
    cardinality: u64,
}

impl SegmentSampler {
    pub fn new(cardinality: u64, skew: f64) -> Result<Self, ConfigError> {
        if cardinality == 0 {
            return Err(ConfigError::ZeroSegmentCardinality);
        }
        if skew.is_nan() || skew <= 1.0 {
            return Err(ConfigError::InvalidSkew(skew));
        }
        let dist = Zipf::new(cardinality, skew).map_err(|_| ConfigError::InvalidSkew(skew))?;
        Ok(Self { dist, cardinality })
    }

    /// Draw a segment index in `[0, cardinality)`. Rank 1 maps to index 0.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let rank = rng.sample(&self.dist) as u64;
        rank.saturating_sub(1).min(self.cardinality - 1)
    }
}

/// Half-normal sampler over the user universe, clipped at `clip` standard deviations.
///
/// Most draws land near user 0; the tail towards `cardinality` thins out quickly.
pub struct UserSampler {
    cardinality: u64,
    clip: f64,
}

impl UserSampler {
    pub fn new(cardinality: u64, clip: f64) -> Result<Self, ConfigError> {
        if cardinality == 0 {
            return Err(ConfigError::ZeroUserCardinality);
        }
        if clip.is_nan() || clip <= 0.0 {
            return Err(ConfigError::InvalidClip(clip));
        }
        Ok(Self { cardinality, clip })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let z: f64 = rng.sample(StandardNormal);
        let p = (z.abs() / self.clip).clamp(0.0, 1.0);
        let user = (p * self.cardinality as f64) as u64;
        // p == 1.0 would otherwise land one past the last user.
        user.min(self.cardinality - 1)
    }
}

pub struct ActionSampler {
    add_probability: f32,
}

impl ActionSampler {
    pub fn new(add_probability: f32) -> Result<Self, ConfigError> {
        check_probability("add_probability", add_probability)?;
        Ok(Self { add_probability })
    }

    /// Returns `true` for "add", `false` for "remove".
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen::<f32>() < self.add_probability
    }
}

pub(crate) fn check_probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}
