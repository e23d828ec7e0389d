use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use eventbook_core::{
    errors::BookingError,
    models::{
        event::{BookedEvent, BookingRequest, EventList},
        schedule::FreeSlots,
    },
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{ApiState, middleware::error_handling::AppError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FreeSlotsQuery {
    pub date: Option<String>,
    pub timezone: Option<String>,
}

// Rejections are client mistakes. Report them as 400 so 422 keeps meaning
// "slot taken".
fn query_rejection(rejection: QueryRejection) -> AppError {
    AppError(BookingError::Validation(rejection.body_text()))
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError(BookingError::Validation(rejection.body_text()))
}

#[axum::debug_handler]
pub async fn list_events(
    State(state): State<Arc<ApiState>>,
    query: Result<Query<EventRangeQuery>, QueryRejection>,
) -> Result<Json<EventList>, AppError> {
    let Query(query) = query.map_err(query_rejection)?;

    let events = state
        .service
        .list_events(query.start_date.as_deref(), query.end_date.as_deref())
        .await?;

    Ok(Json(events))
}

#[axum::debug_handler]
pub async fn free_slots(
    State(state): State<Arc<ApiState>>,
    query: Result<Query<FreeSlotsQuery>, QueryRejection>,
) -> Result<Json<FreeSlots>, AppError> {
    let Query(query) = query.map_err(query_rejection)?;

    let slots = state
        .service
        .free_slots(query.date.as_deref(), query.timezone.as_deref())
        .await?;

    Ok(Json(slots))
}

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Json<BookedEvent>, AppError> {
    let Json(payload) = payload.map_err(json_rejection)?;

    let event = state.service.create_event(&payload).await?;

    Ok(Json(event))
}
