use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::time::iso_millis;

/// A persisted booking. The repository assigns `id` on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedEvent {
    pub id: Uuid,
    #[serde(with = "iso_millis")]
    pub start: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub end: DateTime<Utc>,
}

impl BookedEvent {
    /// True interval overlap: the two half-open intervals share an instant.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    /// Closed-interval intersection, used when fetching events for the
    /// availability filter.
    pub fn touches(&self, lower: DateTime<Utc>, upper: DateTime<Utc>) -> bool {
        self.start <= upper && self.end >= lower
    }
}

/// Raw booking input as sent by a client.
///
/// Fields stay loosely typed so that a missing value, a value of the wrong
/// JSON type and a malformed value each surface as a validation error
/// rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub datetime: Option<Value>,
    #[serde(default)]
    pub duration: Option<Value>,
}

/// A validated booking interval, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingInterval {
    /// `None` when the end instant is not representable.
    pub fn new(start: DateTime<Utc>, duration_minutes: i64) -> Option<Self> {
        let end = start.checked_add_signed(Duration::try_minutes(duration_minutes)?)?;
        Some(Self { start, end })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventList {
    pub data: Vec<BookedEvent>,
}
