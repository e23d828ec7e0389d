//! # Event Repository
//!
//! The persistence contract the booking logic depends on. Implementations
//! live in `eventbook-db`: a PostgreSQL repository for deployments and an
//! in-memory one for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;

use crate::models::event::BookedEvent;

/// Outcome of an atomic check-and-insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// No overlapping event existed; the new event was stored.
    Committed(BookedEvent),
    /// At least one stored event overlaps the requested interval.
    Conflict,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Events whose start lies in `[lower, upper]`, ascending by start.
    async fn query_by_start_range(
        &self,
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
    ) -> Result<Vec<BookedEvent>>;

    /// Events with `start <= upper` and `end >= lower`, ascending by start.
    async fn query_intersecting(
        &self,
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
    ) -> Result<Vec<BookedEvent>>;

    /// Number of stored events with `existing.start < end` and `existing.end > start`.
    async fn count_overlapping(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64>;

    /// Stores an event without any overlap check.
    async fn insert(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<BookedEvent>;

    /// Checks for overlap and inserts as one indivisible step.
    ///
    /// Two concurrent calls for overlapping intervals must never both
    /// return [`Admission::Committed`].
    async fn check_and_insert(&self, start: DateTime<Utc>, end: DateTime<Utc>)
    -> Result<Admission>;
}
