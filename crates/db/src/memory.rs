//! In-process [`EventRepository`] used by tests and by the server when no
//! database is configured. Events are lost when the process exits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventbook_core::{
    models::event::BookedEvent,
    repository::{Admission, EventRepository},
};
use eyre::Result;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Events kept sorted by start. `check_and_insert` holds the write lock for
/// both the overlap check and the insert.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: RwLock<Vec<BookedEvent>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut events: Vec<BookedEvent>) -> Self {
        events.sort_by_key(|e| e.start);
        Self {
            events: RwLock::new(events),
        }
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

fn push_sorted(
    events: &mut Vec<BookedEvent>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> BookedEvent {
    let event = BookedEvent {
        id: Uuid::new_v4(),
        start,
        end,
    };
    let position = events.partition_point(|e| e.start <= start);
    events.insert(position, event.clone());
    event
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn query_by_start_range(
        &self,
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
    ) -> Result<Vec<BookedEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.start >= lower && e.start <= upper)
            .cloned()
            .collect())
    }

    async fn query_intersecting(
        &self,
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
    ) -> Result<Vec<BookedEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.touches(lower, upper))
            .cloned()
            .collect())
    }

    async fn count_overlapping(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64> {
        let events = self.events.read().await;
        Ok(events.iter().filter(|e| e.overlaps(start, end)).count() as u64)
    }

    async fn insert(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<BookedEvent> {
        let mut events = self.events.write().await;
        Ok(push_sorted(&mut events, start, end))
    }

    async fn check_and_insert(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Admission> {
        let mut events = self.events.write().await;
        if events.iter().any(|e| e.overlaps(start, end)) {
            return Ok(Admission::Conflict);
        }
        Ok(Admission::Committed(push_sorted(&mut events, start, end)))
    }
}
