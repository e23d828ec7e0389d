use crate::models::DbEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventbook_core::{
    models::event::BookedEvent,
    repository::{Admission, EventRepository},
};
use eyre::Result;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

/// Advisory lock taken by every admission. There is a single provider, so
/// one key serialises all check-and-insert transactions.
const ADMISSION_LOCK_KEY: i64 = 0x6576_656e_7473;

pub async fn create_event(
    pool: &Pool<Postgres>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<DbEvent> {
    let mut conn = pool.acquire().await?;
    insert_event(&mut conn, start_time, end_time).await
}

async fn insert_event(
    conn: &mut PgConnection,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<DbEvent> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        INSERT INTO events (id, start_time, end_time, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, start_time, end_time, created_at
        "#,
    )
    .bind(id)
    .bind(start_time)
    .bind(end_time)
    .bind(now)
    .fetch_one(conn)
    .await?;

    Ok(event)
}

pub async fn get_events_by_start_range(
    pool: &Pool<Postgres>,
    lower: DateTime<Utc>,
    upper: DateTime<Utc>,
) -> Result<Vec<DbEvent>> {
    let events = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, start_time, end_time, created_at
        FROM events
        WHERE start_time >= $1 AND start_time <= $2
        ORDER BY start_time ASC
        "#,
    )
    .bind(lower)
    .bind(upper)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn get_events_intersecting(
    pool: &Pool<Postgres>,
    lower: DateTime<Utc>,
    upper: DateTime<Utc>,
) -> Result<Vec<DbEvent>> {
    let events = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, start_time, end_time, created_at
        FROM events
        WHERE start_time <= $2 AND end_time >= $1
        ORDER BY start_time ASC
        "#,
    )
    .bind(lower)
    .bind(upper)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn count_overlapping_events(
    pool: &Pool<Postgres>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<u64> {
    let mut conn = pool.acquire().await?;
    count_overlapping_on(&mut conn, start_time, end_time).await
}

async fn count_overlapping_on(
    conn: &mut PgConnection,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<u64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM events
        WHERE start_time < $2 AND end_time > $1
        "#,
    )
    .bind(start_time)
    .bind(end_time)
    .fetch_one(conn)
    .await?;

    Ok(u64::try_from(count)?)
}

/// Inserts the event unless it overlaps an existing one.
///
/// Runs in a single transaction holding [`ADMISSION_LOCK_KEY`], so a
/// concurrent admission for an overlapping interval waits for this one to
/// commit and then sees its row. Returns `None` on conflict.
pub async fn create_event_if_free(
    pool: &Pool<Postgres>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<Option<DbEvent>> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(ADMISSION_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    let overlapping = count_overlapping_on(&mut *tx, start_time, end_time).await?;
    if overlapping > 0 {
        tracing::debug!(
            "Overlap found: start={}, end={}, overlapping={}",
            start_time,
            end_time,
            overlapping
        );
        tx.rollback().await?;
        return Ok(None);
    }

    let event = insert_event(&mut *tx, start_time, end_time).await?;
    tx.commit().await?;

    tracing::debug!("Event created: id={}", event.id);
    Ok(Some(event))
}

/// [`EventRepository`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: Pool<Postgres>,
}

impl PgEventRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn query_by_start_range(
        &self,
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
    ) -> Result<Vec<BookedEvent>> {
        let rows = get_events_by_start_range(&self.pool, lower, upper).await?;
        Ok(rows.into_iter().map(BookedEvent::from).collect())
    }

    async fn query_intersecting(
        &self,
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
    ) -> Result<Vec<BookedEvent>> {
        let rows = get_events_intersecting(&self.pool, lower, upper).await?;
        Ok(rows.into_iter().map(BookedEvent::from).collect())
    }

    async fn count_overlapping(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64> {
        count_overlapping_events(&self.pool, start, end).await
    }

    async fn insert(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<BookedEvent> {
        Ok(create_event(&self.pool, start, end).await?.into())
    }

    async fn check_and_insert(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Admission> {
        Ok(match create_event_if_free(&self.pool, start, end).await? {
            Some(row) => Admission::Committed(row.into()),
            None => Admission::Conflict,
        })
    }
}
