//! Airbyte-style protocol messages, written as newline-delimited JSON.

use crate::config::ConnectorState;
use crate::error::ConnectorError;
use segment_engine::Event;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

pub const STREAM_NAME: &str = "segmentation-events";

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message<'a> {
    Spec {
        spec: Spec,
    },
    ConnectionStatus {
        #[serde(rename = "connectionStatus")]
        connection_status: ConnectionStatus,
    },
    Catalog {
        catalog: Catalog,
    },
    Record {
        record: Record<'a>,
    },
    State {
        state: State<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    pub supports_incremental: bool,
    #[serde(rename = "supported_destination_sync_modes")]
    pub supported_destination_sync_modes: Vec<&'static str>,
    pub connection_specification: Value,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Succeeded,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Catalog {
    pub streams: Vec<Stream>,
}

#[derive(Debug, Serialize)]
pub struct Stream {
    pub name: &'static str,
    pub json_schema: Value,
    pub supported_sync_modes: Vec<&'static str>,
    pub source_defined_cursor: bool,
    pub source_defined_primary_key: Vec<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
pub struct Record<'a> {
    pub stream: &'a str,
    pub emitted_at: i64,
    pub data: &'a Event,
}

#[derive(Debug, Serialize)]
pub struct State<'a> {
    pub data: &'a ConnectorState,
}

pub const ALL_SYNC_MODES: [&str; 2] = ["incremental", "full_refresh"];
pub const ALL_DESTINATION_SYNC_MODES: [&str; 3] = ["overwrite", "append", "append_dedup"];

/// Writes one JSON message per line.
pub struct Encoder<W: Write> {
    out: W,
}

impl<W: Write> Encoder<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn encode(&mut self, message: &Message<'_>) -> Result<(), ConnectorError> {
        let line = serde_json::to_vec(message)?;
        self.out.write_all(&line)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn record(&mut self, event: &Event) -> Result<(), ConnectorError> {
        self.encode(&Message::Record {
            record: Record {
                stream: STREAM_NAME,
                emitted_at: chrono::Utc::now().timestamp_millis(),
                data: event,
            },
        })
    }

    pub fn state(&mut self, state: &ConnectorState) -> Result<(), ConnectorError> {
        self.encode(&Message::State {
            state: State { data: state },
        })
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
