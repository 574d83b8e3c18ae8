use crate::error::ConnectorError;
use segment_engine::{ConfigError, Engine};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfig {
    #[serde(default)]
    pub max_events_per_second: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    pub segment_cardinality: u64,
    pub user_cardinality: u64,
}

impl ConnectorConfig {
    /// Normalize the event rate and reject empty universes.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.max_events_per_second <= 0 {
            self.max_events_per_second = 1;
        }
        if self.segment_cardinality == 0 {
            return Err(ConfigError::ZeroSegmentCardinality);
        }
        if self.user_cardinality == 0 {
            return Err(ConfigError::ZeroUserCardinality);
        }
        Ok(())
    }

    /// Seed for the engine RNG. Zero is treated as unset.
    pub fn rng_seed(&self) -> Option<i64> {
        self.seed.filter(|&s| s != 0)
    }

    pub fn events_per_second(&self) -> u32 {
        u32::try_from(self.max_events_per_second.max(1)).unwrap_or(u32::MAX)
    }

    pub fn build_engine(&self) -> Result<Engine, ConfigError> {
        Engine::new(
            self.segment_cardinality,
            self.user_cardinality,
            self.rng_seed(),
        )
    }

    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConnectorError> {
        let mut config: Self = load_json(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Checkpointed read progress.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConnectorState {
    #[serde(default)]
    pub cursor: u64,
}

impl ConnectorState {
    pub fn advance_cursor(&mut self) {
        self.cursor += 1;
    }
}

/// The subset of a configured catalog this connector reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfiguredCatalog {
    #[serde(default)]
    pub streams: Vec<Value>,
    #[serde(rename = "estuary.dev/tail", default)]
    pub tail: bool,
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConnectorError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConnectorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConnectorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn config_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Segmentation Generator Source Spec",
        "type": "object",
        "required": ["segmentCardinality", "userCardinality"],
        "properties": {
            "maxEventsPerSecond": {
                "type": "integer",
                "title": "Number of Events per Second",
                "description": "Maximum number of Events produced per second",
                "default": 1000
            },
            "seed": {
                "type": "integer",
                "title": "Random Seed",
                "description": "Seed for the random number generator. Omit to derive one from the current time"
            },
            "segmentCardinality": {
                "type": "integer",
                "title": "Number of Segments",
                "description": "Number of unique segments to use when generating events",
                "default": 1000
            },
            "userCardinality": {
                "type": "integer",
                "title": "Number of Users",
                "description": "Number of unique users to use when generating events",
                "default": 10000
            }
        }
    })
}

pub fn event_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "event": {"type": "string"},
            "timestamp": {"type": "string"},
            "user": {"type": "string"},
            "segment": {
                "type": "object",
                "properties": {
                    "vendor": {"type": "number"},
                    "name": {"type": "string"}
                }
            },
            "remove": {"type": ["boolean", "null"]}
        },
        "required": ["event", "timestamp", "user", "segment"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(json: &str) -> ConnectorConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn rate_defaults_to_one() {
        let mut config = parse(r#"{"segmentCardinality": 10, "userCardinality": 10}"#);
        config.validate().unwrap();
        assert_eq!(config.max_events_per_second, 1);

        let mut config = parse(
            r#"{"maxEventsPerSecond": -5, "segmentCardinality": 10, "userCardinality": 10}"#,
        );
        config.validate().unwrap();
        assert_eq!(config.events_per_second(), 1);
    }

    #[test]
    fn keeps_positive_rate() {
        let mut config = parse(
            r#"{"maxEventsPerSecond": 250, "segmentCardinality": 10, "userCardinality": 10}"#,
        );
        config.validate().unwrap();
        assert_eq!(config.events_per_second(), 250);
    }

    #[test]
    fn rejects_zero_cardinality() {
        let mut config = parse(r#"{"segmentCardinality": 0, "userCardinality": 10}"#);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroSegmentCardinality)
        ));

        let mut config = parse(r#"{"segmentCardinality": 10, "userCardinality": 0}"#);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroUserCardinality)
        ));
    }

    #[test]
    fn missing_cardinality_fails_to_parse() {
        assert!(serde_json::from_str::<ConnectorConfig>(r#"{"segmentCardinality": 10}"#).is_err());
    }

    #[test]
    fn zero_seed_is_unset() {
        let config = parse(r#"{"seed": 0, "segmentCardinality": 1, "userCardinality": 1}"#);
        assert_eq!(config.rng_seed(), None);

        let config = parse(r#"{"seed": 8675309, "segmentCardinality": 1, "userCardinality": 1}"#);
        assert_eq!(config.rng_seed(), Some(8675309));
        assert_eq!(config.build_engine().unwrap().seed(), 8675309);
    }

    #[test]
    fn state_round_trips_cursor() {
        let mut state: ConnectorState = serde_json::from_str(r#"{"cursor": 41}"#).unwrap();
        state.advance_cursor();
        assert_eq!(serde_json::to_string(&state).unwrap(), r#"{"cursor":42}"#);

        let empty: ConnectorState = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.cursor, 0);
    }

    #[test]
    fn catalog_tail_flag() {
        let catalog: ConfiguredCatalog =
            serde_json::from_str(r#"{"streams": [], "estuary.dev/tail": true}"#).unwrap();
        assert!(catalog.tail);

        let catalog: ConfiguredCatalog = serde_json::from_str(r#"{"streams": []}"#).unwrap();
        assert!(!catalog.tail);
    }

    #[test]
    fn load_reports_path_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = ConnectorConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConnectorError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));

        let err = ConnectorConfig::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConnectorError::Read { .. }));
    }

    #[test]
    fn load_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"segmentCardinality": 5, "userCardinality": 0}}"#).unwrap();
        assert!(matches!(
            ConnectorConfig::load(file.path()),
            Err(ConnectorError::Config(ConfigError::ZeroUserCardinality))
        ));
    }
}
