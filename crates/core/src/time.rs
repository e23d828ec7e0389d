//! # Time Conversion
//!
//! Helpers for moving between wall-clock times in named IANA timezones and
//! absolute UTC instants, plus the parsing and formatting rules used for
//! every timestamp that crosses the HTTP boundary.
//!
//! UTC offsets are resolved per calendar date through `chrono-tz`, so
//! daylight-saving transitions are honoured rather than assuming a fixed
//! offset for a zone.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat,
    TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::errors::{BookingError, BookingResult};

/// Parses an IANA timezone name such as `Asia/Kolkata` or `America/New_York`.
///
/// # Errors
///
/// * `BookingError::InvalidTimezone` - The name is not in the tz database
pub fn parse_timezone(name: &str) -> BookingResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| BookingError::InvalidTimezone(format!("'{}'", name)))
}

/// Converts a wall-clock time on `date` in `timezone` to an absolute instant.
///
/// When the local time occurs twice (the clocks go back), the earlier
/// instant is used. When the local time is skipped (the clocks go forward),
/// the time is read with the offset in force before the gap, which moves it
/// forward by the length of the gap.
pub fn to_instant(date: NaiveDate, time: NaiveTime, timezone: Tz) -> BookingResult<DateTime<Utc>> {
    let local = date.and_time(time);

    match timezone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => shift_across_gap(local, timezone),
    }
}

fn shift_across_gap(local: NaiveDateTime, timezone: Tz) -> BookingResult<DateTime<Utc>> {
    // Transitions in the tz database never skip more than a few hours.
    let before_gap = local - Duration::hours(3);
    let offset = timezone
        .from_local_datetime(&before_gap)
        .earliest()
        .map(|dt| dt.offset().fix().local_minus_utc())
        .ok_or_else(|| {
            BookingError::validation(format!(
                "Local time {} does not exist in {}",
                local,
                timezone.name()
            ))
        })?;

    let utc = local - Duration::seconds(i64::from(offset));
    Ok(Utc.from_utc_datetime(&utc))
}

/// Expresses an absolute instant as wall-clock time in `timezone`.
pub fn to_wall_clock(instant: DateTime<Utc>, timezone: Tz) -> DateTime<Tz> {
    instant.with_timezone(&timezone)
}

const NANOS_PER_MILLI: u32 = 1_000_000;

/// Parses an RFC 3339 instant that carries a UTC designator.
///
/// Accepts `2024-01-10T05:00:00.000Z`, `2024-01-10T05:00:00Z` and
/// `2024-01-10T05:00:00+00:00`. Instants with any other offset are refused,
/// since every instant stored or compared by this service is UTC.
///
/// Instants are written back with millisecond precision, so anything finer
/// is refused too. Otherwise a stored interval could differ from the one
/// reported to the client.
pub fn parse_iso_instant(value: &str) -> Option<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value).ok()?;
    if parsed.offset().local_minus_utc() != 0 {
        return None;
    }
    if parsed.timestamp_subsec_nanos() % NANOS_PER_MILLI != 0 {
        return None;
    }
    Some(parsed.with_timezone(&Utc))
}

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Formats a zoned time as `YYYY-MM-DDTHH:MM:SS±hh:mm`.
pub fn format_wall_clock(time: DateTime<Tz>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Serde adapter that writes UTC instants with millisecond precision and
/// reads anything [`parse_iso_instant`] accepts.
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_instant(*instant))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso_instant(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid UTC instant: {}", raw)))
    }
}

/// Serde adapter for `hh:mm` wall-clock times.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .map_err(|e| D::Error::custom(format!("invalid time '{}': {}", raw, e)))
    }
}
