use crate::clock::format_timestamp;
use crate::identity::EventId;
use crate::sample::Sample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Universe of vendors, mapped onto by segment modulo.
pub const VENDOR_CARDINALITY: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub vendor: u64,
    pub name: String,
}

/// A user joining (or, with `remove`, leaving) a segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event")]
    pub id: String,
    pub timestamp: String,
    pub user: String,
    pub segment: Segment,
    #[serde(default, skip_serializing_if = "is_false")]
    pub remove: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Build the emitted record for `sample` at `now`.
pub fn assemble(sample: &Sample, id: EventId, now: &DateTime<Utc>) -> Event {
    Event {
        id: id.to_string(),
        timestamp: format_timestamp(now),
        user: format!("usr-{:06x}", sample.user),
        segment: Segment {
            vendor: 1 + sample.segment % VENDOR_CARDINALITY,
            name: format!("seg-{:X}", sample.segment),
        },
        remove: !sample.add,
    }
}
