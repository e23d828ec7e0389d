use chrono::{DateTime, Utc};
use eventbook_core::models::event::BookedEvent;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEvent {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<DbEvent> for BookedEvent {
    fn from(row: DbEvent) -> Self {
        BookedEvent {
            id: row.id,
            start: row.start_time,
            end: row.end_time,
        }
    }
}
