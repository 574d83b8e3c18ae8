use crate::config::{
    config_schema, event_schema, load_json, ConfiguredCatalog, ConnectorConfig, ConnectorState,
};
use crate::error::ConnectorError;
use crate::protocol::{
    Catalog, ConnectionStatus, Encoder, Message, Spec, Status, Stream, ALL_DESTINATION_SYNC_MODES,
    ALL_SYNC_MODES, STREAM_NAME,
};
use crate::read::Reader;
use std::io::Write;
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub fn spec<W: Write>(out: W) -> Result<(), ConnectorError> {
    Encoder::new(out).encode(&Message::Spec {
        spec: Spec {
            supports_incremental: true,
            supported_destination_sync_modes: ALL_DESTINATION_SYNC_MODES.to_vec(),
            connection_specification: config_schema(),
        },
    })
}

/// Validation failures are reported in the status message, not as an error.
pub fn check<W: Write>(config: &Path, out: W) -> Result<(), ConnectorError> {
    let connection_status = match ConnectorConfig::load(config) {
        Ok(_) => ConnectionStatus {
            status: Status::Succeeded,
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "config check failed");
            ConnectionStatus {
                status: Status::Failed,
                message: Some(e.to_string()),
            }
        }
    };
    Encoder::new(out).encode(&Message::ConnectionStatus { connection_status })
}

pub fn discover<W: Write>(config: &Path, out: W) -> Result<(), ConnectorError> {
    ConnectorConfig::load(config)?;
    Encoder::new(out).encode(&Message::Catalog {
        catalog: Catalog {
            streams: vec![Stream {
                name: STREAM_NAME,
                json_schema: event_schema(),
                supported_sync_modes: ALL_SYNC_MODES.to_vec(),
                source_defined_cursor: true,
                source_defined_primary_key: vec![vec!["event"]],
            }],
        },
    })
}

pub async fn read<W: Write>(
    config: &Path,
    catalog: &Path,
    state: Option<&Path>,
    out: W,
    shutdown: &CancellationToken,
) -> Result<ConnectorState, ConnectorError> {
    let config = ConnectorConfig::load(config)?;
    let catalog: ConfiguredCatalog = load_json(catalog)?;
    let state: ConnectorState = match state {
        Some(path) => load_json(path)?,
        None => ConnectorState::default(),
    };

    let engine = config.build_engine()?;
    tracing::info!(
        segment_cardinality = config.segment_cardinality,
        user_cardinality = config.user_cardinality,
        max_events_per_second = config.events_per_second(),
        seed = engine.seed(),
        cursor = state.cursor,
        streams = catalog.streams.len(),
        tail = catalog.tail,
        "starting read"
    );

    let mut reader = Reader::new(engine, out, config.events_per_second(), state, catalog.tail);
    let state = reader.run(shutdown).await?;

    let stats = reader.engine().repetition_stats();
    tracing::info!(
        cursor = state.cursor,
        repeats = stats.repeats,
        buffered = stats.len,
        "read finished"
    );
    Ok(state)
}
