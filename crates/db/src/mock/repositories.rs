use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventbook_core::{
    models::event::BookedEvent,
    repository::{Admission, EventRepository},
};
use mockall::mock;

// Mock repositories for testing
mock! {
    pub EventRepo {}

    #[async_trait]
    impl EventRepository for EventRepo {
        async fn query_by_start_range(
            &self,
            lower: DateTime<Utc>,
            upper: DateTime<Utc>,
        ) -> eyre::Result<Vec<BookedEvent>>;

        async fn query_intersecting(
            &self,
            lower: DateTime<Utc>,
            upper: DateTime<Utc>,
        ) -> eyre::Result<Vec<BookedEvent>>;

        async fn count_overlapping(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> eyre::Result<u64>;

        async fn insert(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> eyre::Result<BookedEvent>;

        async fn check_and_insert(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> eyre::Result<Admission>;
    }
}
