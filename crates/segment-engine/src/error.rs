/// Invalid engine construction parameters. Always fatal, raised before any event is generated.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("segmentCardinality must be greater than 0")]
    ZeroSegmentCardinality,

    #[error("userCardinality must be greater than 0")]
    ZeroUserCardinality,

    #[error("segment skew must be greater than 1, got {0}")]
    InvalidSkew(f64),

    #[error("user clip factor must be positive, got {0}")]
    InvalidClip(f64),

    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f32 },
}
