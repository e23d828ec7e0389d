use std::{future::IntoFuture, sync::Arc};

use axum::http::StatusCode;
use chrono::{DateTime, TimeZone, Utc};
use eventbook_core::{
    models::event::BookedEvent,
    repository::{Admission, EventRepository},
};
use eventbook_db::{InMemoryEventRepository, mock::repositories::MockEventRepo};
use mockall::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{memory_server, server_with};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, hour, minute, 0).unwrap()
}

fn event(start: DateTime<Utc>, end: DateTime<Utc>) -> BookedEvent {
    BookedEvent {
        id: Uuid::new_v4(),
        start,
        end,
    }
}

#[tokio::test]
async fn test_create_event_on_empty_calendar() {
    let (server, repository) = memory_server();

    let response = server
        .post("/events")
        .json(&json!({ "datetime": "2024-01-10T05:00:00.000Z", "duration": 30 }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["start"], "2024-01-10T05:00:00.000Z");
    assert_eq!(body["end"], "2024-01-10T05:30:00.000Z");
    assert!(body["id"].as_str().is_some_and(|id| Uuid::parse_str(id).is_ok()));
    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn test_repeated_booking_is_rejected() {
    let (server, repository) = memory_server();
    let request = json!({ "datetime": "2024-01-10T05:00:00.000Z", "duration": 30 });

    server
        .post("/events")
        .json(&request)
        .await
        .assert_status(StatusCode::OK);

    let response = server.post("/events").json(&request).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Time slot is not available"));
    assert_eq!(repository.len().await, 1);
}

#[rstest]
#[case::partial_overlap("2024-01-10T04:45:00.000Z", 30)]
#[case::contained("2024-01-10T05:10:00.000Z", 10)]
#[case::containing("2024-01-10T04:00:00.000Z", 120)]
#[tokio::test]
async fn test_overlapping_booking_is_rejected(#[case] datetime: &str, #[case] duration: i64) {
    let repository = Arc::new(InMemoryEventRepository::with_events(vec![event(
        at(5, 0),
        at(5, 30),
    )]));
    let server = server_with(repository.clone());

    let response = server
        .post("/events")
        .json(&json!({ "datetime": datetime, "duration": duration }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn test_adjacent_booking_is_accepted() {
    let repository = Arc::new(InMemoryEventRepository::with_events(vec![event(
        at(5, 0),
        at(5, 30),
    )]));
    let server = server_with(repository.clone());

    let response = server
        .post("/events")
        .json(&json!({ "datetime": "2024-01-10T05:30:00.000Z", "duration": 30 }))
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(repository.len().await, 2);
}

#[tokio::test]
async fn test_booking_at_returned_end_is_accepted() {
    let (server, repository) = memory_server();

    let first = server
        .post("/events")
        .json(&json!({ "datetime": "2024-01-10T05:00:00.250Z", "duration": 30 }))
        .await;
    first.assert_status(StatusCode::OK);
    let first: Value = first.json();
    assert_eq!(first["end"], "2024-01-10T05:30:00.250Z");

    let response = server
        .post("/events")
        .json(&json!({ "datetime": first["end"], "duration": 30 }))
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(repository.len().await, 2);
}

#[rstest]
#[case::invalid_datetime(json!({ "datetime": "not-a-date", "duration": 30 }), "Datetime is invalid")]
#[case::missing_datetime(json!({ "duration": 30 }), "Datetime is required")]
#[case::local_datetime(json!({ "datetime": "2024-01-10T05:00:00", "duration": 30 }), "Datetime is invalid")]
#[case::sub_millisecond_datetime(
    json!({ "datetime": "2024-01-10T05:00:00.0005Z", "duration": 30 }),
    "Datetime is invalid"
)]
#[case::missing_duration(json!({ "datetime": "2024-01-10T05:00:00.000Z" }), "Duration is required")]
#[case::fractional_duration(
    json!({ "datetime": "2024-01-10T05:00:00.000Z", "duration": 12.5 }),
    "Duration must be in minutes, allows integer value only"
)]
#[case::string_duration(
    json!({ "datetime": "2024-01-10T05:00:00.000Z", "duration": "30" }),
    "Duration must be in minutes, allows integer value only"
)]
#[case::zero_duration(
    json!({ "datetime": "2024-01-10T05:00:00.000Z", "duration": 0 }),
    "Duration must be a positive number of minutes"
)]
#[tokio::test]
async fn test_invalid_booking_request(#[case] request: Value, #[case] message: &str) {
    let (server, repository) = memory_server();

    let response = server.post("/events").json(&request).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(
        body["error"].as_str().unwrap().contains(message),
        "unexpected error body: {}",
        body
    );
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (server, _) = memory_server();

    let response = server
        .post("/events")
        .content_type("application/json")
        .text("{ not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_simultaneous_bookings_commit_once() {
    let (server, repository) = memory_server();
    let request = json!({ "datetime": "2024-01-10T07:00:00.000Z", "duration": 30 });

    let first = server.post("/events").json(&request).into_future();
    let second = server.post("/events").json(&request).into_future();
    let (first, second) = tokio::join!(first, second);

    let mut statuses = vec![first.status_code(), second.status_code()];
    statuses.sort();
    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::UNPROCESSABLE_ENTITY]
    );
    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn test_validation_happens_before_storage() {
    // No expectations: any repository call fails the test
    let repository = MockEventRepo::new();
    let server = server_with(Arc::new(repository));

    server
        .post("/events")
        .json(&json!({ "datetime": "2024-01-10T05:00:00.000Z", "duration": -5 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let mut repository = MockEventRepo::new();
    repository
        .expect_check_and_insert()
        .with(predicate::eq(at(5, 0)), predicate::eq(at(5, 30)))
        .times(1)
        .returning(|_, _| Err(eyre::eyre!("connection refused")));
    let server = server_with(Arc::new(repository));

    let response = server
        .post("/events")
        .json(&json!({ "datetime": "2024-01-10T05:00:00.000Z", "duration": 30 }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_conflict_from_repository_is_unprocessable() {
    let mut repository = MockEventRepo::new();
    repository
        .expect_check_and_insert()
        .times(1)
        .returning(|_, _| Ok(Admission::Conflict));
    let server = server_with(Arc::new(repository));

    server
        .post("/events")
        .json(&json!({ "datetime": "2024-01-10T05:00:00.000Z", "duration": 30 }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_free_slots_on_empty_calendar() {
    let (server, _) = memory_server();

    let response = server
        .get("/events/free-slots")
        .add_query_param("date", "2024-01-10")
        .add_query_param("timezone", "Asia/Kolkata")
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 10);
    assert_eq!(slots[0], "2024-01-10T10:30:00+05:30");
    assert_eq!(slots[9], "2024-01-10T15:00:00+05:30");
    assert_eq!(body["slotTimezone"], "Asia/Kolkata");
    assert_eq!(
        body["doctorProfile"],
        json!({
            "startHours": "10:30",
            "endHours": "15:30",
            "duration": 30,
            "timezone": "Asia/Kolkata"
        })
    );
}

#[tokio::test]
async fn test_free_slots_skip_booked_event() {
    let repository = Arc::new(InMemoryEventRepository::with_events(vec![event(
        at(5, 0),
        at(5, 30),
    )]));
    let server = server_with(repository);

    let response = server
        .get("/events/free-slots")
        .add_query_param("date", "2024-01-10")
        .add_query_param("timezone", "UTC")
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    let slots: Vec<&str> = body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();

    // Both endpoints of the booked event are blocked
    assert_eq!(slots.len(), 8);
    assert!(!slots.contains(&"2024-01-10T05:00:00+00:00"));
    assert!(!slots.contains(&"2024-01-10T05:30:00+00:00"));
    assert_eq!(slots[0], "2024-01-10T06:00:00+00:00");
}

#[tokio::test]
async fn test_free_slots_after_booking() {
    let (server, _) = memory_server();

    server
        .post("/events")
        .json(&json!({ "datetime": "2024-01-10T08:00:00.000Z", "duration": 30 }))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .get("/events/free-slots")
        .add_query_param("date", "2024-01-10")
        .add_query_param("timezone", "Asia/Kolkata")
        .await;

    let body: Value = response.json();
    let slots = body["slots"].as_array().unwrap();
    assert!(!slots.contains(&json!("2024-01-10T13:30:00+05:30")));
}

#[rstest]
#[case::missing_date(None, Some("Asia/Kolkata"), "Date is required")]
#[case::invalid_date(Some("10-01-2024"), Some("Asia/Kolkata"), "Date is invalid")]
#[case::missing_timezone(Some("2024-01-10"), None, "Timezone is required")]
#[case::unknown_timezone(Some("2024-01-10"), Some("Mars/Olympus"), "Timezone is invalid")]
#[tokio::test]
async fn test_free_slots_bad_request(
    #[case] date: Option<&str>,
    #[case] timezone: Option<&str>,
    #[case] message: &str,
) {
    let (server, _) = memory_server();

    let mut request = server.get("/events/free-slots");
    if let Some(date) = date {
        request = request.add_query_param("date", date);
    }
    if let Some(timezone) = timezone {
        request = request.add_query_param("timezone", timezone);
    }
    let response = request.await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains(message));
}

#[tokio::test]
async fn test_list_events_in_range() {
    let repository = Arc::new(InMemoryEventRepository::with_events(vec![
        event(at(9, 0), at(9, 30)),
        event(at(5, 0), at(5, 30)),
        event(at(20, 0), at(20, 30)),
    ]));
    let server = server_with(repository);

    let response = server
        .get("/events")
        .add_query_param("startDate", "2024-01-10T05:00:00.000Z")
        .add_query_param("endDate", "2024-01-10T12:00:00.000Z")
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    let starts: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["start"].as_str())
        .collect();
    assert_eq!(
        starts,
        vec!["2024-01-10T05:00:00.000Z", "2024-01-10T09:00:00.000Z"]
    );
}

#[tokio::test]
async fn test_list_events_queries_requested_range() {
    let mut repository = MockEventRepo::new();
    repository
        .expect_query_by_start_range()
        .with(predicate::eq(at(0, 0)), predicate::eq(at(23, 59)))
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    let server = server_with(Arc::new(repository));

    let response = server
        .get("/events")
        .add_query_param("startDate", "2024-01-10T00:00:00Z")
        .add_query_param("endDate", "2024-01-10T23:59:00Z")
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "data": [] }));
}

#[rstest]
#[case::missing_start(None, Some("2024-01-10T12:00:00.000Z"), "Start date is required")]
#[case::invalid_start(Some("yesterday"), Some("2024-01-10T12:00:00.000Z"), "Start date is invalid")]
#[case::missing_end(Some("2024-01-10T00:00:00.000Z"), None, "End date is required")]
#[case::invalid_end(Some("2024-01-10T00:00:00.000Z"), Some("2024-01-10"), "End date is invalid")]
#[tokio::test]
async fn test_list_events_bad_request(
    #[case] start: Option<&str>,
    #[case] end: Option<&str>,
    #[case] message: &str,
) {
    let (server, _) = memory_server();

    let mut request = server.get("/events");
    if let Some(start) = start {
        request = request.add_query_param("startDate", start);
    }
    if let Some(end) = end {
        request = request.add_query_param("endDate", end);
    }
    let response = request.await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains(message));
}

#[tokio::test]
async fn test_health_and_version() {
    let (server, _) = memory_server();

    let health = server.get("/health").await;
    health.assert_status(StatusCode::OK);
    assert_eq!(health.json::<Value>(), json!({ "status": "ok" }));

    let version = server.get("/version").await;
    version.assert_status(StatusCode::OK);
    assert_eq!(
        version.json::<Value>()["version"],
        env!("CARGO_PKG_VERSION")
    );
}

#[tokio::test]
async fn test_repository_trait_object_is_shared() {
    let repository = Arc::new(InMemoryEventRepository::new());
    let shared: Arc<dyn EventRepository> = repository.clone();
    let server = server_with(shared);

    server
        .post("/events")
        .json(&json!({ "datetime": "2024-01-10T06:00:00.000Z", "duration": 45 }))
        .await
        .assert_status(StatusCode::OK);

    let stored = repository.query_by_start_range(at(0, 0), at(23, 0)).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].end, at(6, 45));
}
