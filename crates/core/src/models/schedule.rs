use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::{BookingError, BookingResult};
use crate::time::hh_mm;

/// What to do with a candidate that starts exactly where the working
/// window ends (or, for spans that do not divide evenly, the first
/// candidate that would run past the end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingSlot {
    /// Only offer slots that finish inside the working window.
    #[default]
    Exclude,
    /// Also offer the first candidate at or past the window end.
    Include,
}

impl std::str::FromStr for TrailingSlot {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude" => Ok(TrailingSlot::Exclude),
            "include" => Ok(TrailingSlot::Include),
            other => Err(BookingError::InvalidSchedule(format!(
                "unknown trailing slot policy '{}'",
                other
            ))),
        }
    }
}

/// The provider's daily working window and slot size.
///
/// Construction goes through [`ProviderSchedule::new`], which rejects an
/// empty or inverted window and slot durations that are non-positive or
/// longer than the window, so every value of this type is safe to enumerate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSchedule {
    start_time: NaiveTime,
    end_time: NaiveTime,
    duration_minutes: i64,
    timezone: Tz,
    trailing: TrailingSlot,
}

impl ProviderSchedule {
    pub fn new(
        start_time: NaiveTime,
        end_time: NaiveTime,
        duration_minutes: i64,
        timezone: Tz,
        trailing: TrailingSlot,
    ) -> BookingResult<Self> {
        if start_time >= end_time {
            return Err(BookingError::InvalidSchedule(format!(
                "start time {} must be before end time {}",
                start_time.format(hh_mm::FORMAT),
                end_time.format(hh_mm::FORMAT)
            )));
        }
        if duration_minutes <= 0 {
            return Err(BookingError::InvalidSchedule(format!(
                "slot duration must be positive, got {} minutes",
                duration_minutes
            )));
        }
        let window_minutes = (end_time - start_time).num_minutes();
        if duration_minutes > window_minutes {
            return Err(BookingError::InvalidSchedule(format!(
                "slot duration of {} minutes does not fit the {} minute window",
                duration_minutes, window_minutes
            )));
        }

        Ok(Self {
            start_time,
            end_time,
            duration_minutes,
            timezone,
            trailing,
        })
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn trailing(&self) -> TrailingSlot {
        self.trailing
    }

    /// Public description of the schedule, as returned with free slots.
    pub fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            start_hours: self.start_time,
            end_hours: self.end_time,
            duration: self.duration_minutes,
            timezone: self.timezone.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    #[serde(with = "hh_mm")]
    pub start_hours: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_hours: NaiveTime,
    /// Slot length in minutes
    pub duration: i64,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeSlots {
    #[serde(rename = "doctorProfile")]
    pub provider_profile: ProviderProfile,
    pub slot_timezone: String,
    pub slots: Vec<String>,
}
