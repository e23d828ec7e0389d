//! # Booking Service
//!
//! Request-scoped operations over a single provider's calendar:
//!
//! - **Free slots**: generate the day's candidates, fetch the events that
//!   could block them, filter
//! - **Event listing**: events starting inside a UTC range
//! - **Admission**: validate a booking request and commit it through the
//!   repository's atomic check-and-insert
//!
//! The service keeps no mutable state of its own. Everything persistent
//! lives behind the injected [`EventRepository`], so concurrent requests
//! only ever contend inside the repository.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    availability,
    errors::{BookingError, BookingResult},
    models::{
        event::{BookedEvent, BookingInterval, BookingRequest, EventList},
        schedule::{FreeSlots, ProviderSchedule},
    },
    repository::{Admission, EventRepository},
    slots, time,
};

pub struct BookingService {
    repository: Arc<dyn EventRepository>,
    schedule: ProviderSchedule,
}

impl BookingService {
    pub fn new(repository: Arc<dyn EventRepository>, schedule: ProviderSchedule) -> Self {
        Self {
            repository,
            schedule,
        }
    }

    pub fn schedule(&self) -> &ProviderSchedule {
        &self.schedule
    }

    /// Free slots on `date`, expressed in `timezone`.
    ///
    /// # Errors
    ///
    /// * `BookingError::Validation` - Missing or malformed date, missing or
    ///   unrecognised timezone
    /// * `BookingError::Repository` - The event query failed
    pub async fn free_slots(
        &self,
        date: Option<&str>,
        timezone: Option<&str>,
    ) -> BookingResult<FreeSlots> {
        let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(date) => time::parse_calendar_date(date)
                .ok_or_else(|| BookingError::validation("Date is invalid"))?,
            None => return Err(BookingError::validation("Date is required")),
        };
        let timezone_name = timezone
            .map(str::trim)
            .filter(|tz| !tz.is_empty())
            .ok_or_else(|| BookingError::validation("Timezone is required"))?;
        let target = time::parse_timezone(timezone_name)
            .map_err(|_| BookingError::validation("Timezone is invalid"))?;

        let candidates = slots::generate_slots(date, &self.schedule, target)?;

        let events = match (candidates.first_instant(), candidates.last_instant()) {
            (Some(first), Some(last)) => self.repository.query_intersecting(first, last).await?,
            _ => Vec::new(),
        };
        let free = availability::filter_available(candidates, &events);

        debug!(
            "Free slots for {} in {}: {} free, {} blocking events",
            date,
            timezone_name,
            free.len(),
            events.len()
        );

        Ok(FreeSlots {
            provider_profile: self.schedule.profile(),
            slot_timezone: target.name().to_string(),
            slots: free.into_iter().map(time::format_wall_clock).collect(),
        })
    }

    /// Events starting inside `[start_date, end_date]`, ascending by start.
    pub async fn list_events(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> BookingResult<EventList> {
        let lower = required_instant(start_date, "Start date")?;
        let upper = required_instant(end_date, "End date")?;

        let data = self.repository.query_by_start_range(lower, upper).await?;
        Ok(EventList { data })
    }

    /// Validates and books `request`.
    ///
    /// Validation happens before any repository call. The overlap check and
    /// the insert are one repository round trip.
    ///
    /// # Errors
    ///
    /// * `BookingError::Validation` - Missing or malformed datetime or duration
    /// * `BookingError::SlotUnavailable` - The interval overlaps a booked event
    /// * `BookingError::Repository` - The store failed
    pub async fn create_event(&self, request: &BookingRequest) -> BookingResult<BookedEvent> {
        let interval = validate_booking(request)?;

        match self
            .repository
            .check_and_insert(interval.start, interval.end)
            .await?
        {
            Admission::Committed(event) => {
                info!(
                    "Booked event: id={}, start={}, end={}",
                    event.id,
                    time::format_instant(event.start),
                    time::format_instant(event.end)
                );
                Ok(event)
            }
            Admission::Conflict => {
                warn!(
                    "Rejected booking: start={}, end={} overlaps an existing event",
                    time::format_instant(interval.start),
                    time::format_instant(interval.end)
                );
                Err(BookingError::SlotUnavailable(
                    "Time slot is not available".to_string(),
                ))
            }
        }
    }
}

/// Checks a booking request and derives its interval.
///
/// Checks run in order and stop at the first failure: datetime present,
/// datetime a UTC instant, duration present, duration a whole number of
/// minutes, duration positive.
pub fn validate_booking(request: &BookingRequest) -> BookingResult<BookingInterval> {
    let start = match request.datetime.as_ref() {
        None | Some(Value::Null) => return Err(BookingError::validation("Datetime is required")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(BookingError::validation("Datetime is required"));
        }
        Some(Value::String(s)) => time::parse_iso_instant(s)
            .ok_or_else(|| BookingError::validation("Datetime is invalid"))?,
        Some(_) => return Err(BookingError::validation("Datetime is invalid")),
    };

    let minutes = match request.duration.as_ref() {
        None | Some(Value::Null) => return Err(BookingError::validation("Duration is required")),
        Some(value) => whole_minutes(value).ok_or_else(|| {
            BookingError::validation("Duration must be in minutes, allows integer value only")
        })?,
    };
    if minutes <= 0 {
        return Err(BookingError::validation(
            "Duration must be a positive number of minutes",
        ));
    }

    BookingInterval::new(start, minutes)
        .ok_or_else(|| BookingError::validation("Duration is out of range"))
}

fn whole_minutes(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(minutes) = number.as_i64() {
        return Some(minutes);
    }
    // 30.0 is still a whole number of minutes
    let float = number.as_f64()?;
    (float.fract() == 0.0).then_some(float as i64)
}

fn required_instant(
    value: Option<&str>,
    label: &str,
) -> BookingResult<chrono::DateTime<chrono::Utc>> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BookingError::validation(format!("{} is required", label)))?;
    time::parse_iso_instant(value)
        .ok_or_else(|| BookingError::validation(format!("{} is invalid", label)))
}
