//! # Slot Generation
//!
//! Turns a provider's local working hours on a given calendar date into the
//! ordered candidate start instants a client may book, expressed in the
//! client's timezone.
//!
//! The working window is resolved to absolute instants in the provider's own
//! timezone first, so a client on the other side of the world sees the same
//! instants as the provider, just with a different offset. The number of
//! candidates is fixed up front from the window length and slot duration:
//!
//! * `TrailingSlot::Exclude` - `floor(span / duration)` slots, each ending
//!   no later than the window end
//! * `TrailingSlot::Include` - `ceil(span / duration) + 1` slots, the last
//!   one starting at or after the window end

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::errors::BookingResult;
use crate::models::schedule::{ProviderSchedule, TrailingSlot};
use crate::time;

/// Resolves the provider's working hours on `date` to UTC instants.
pub fn working_window(
    date: NaiveDate,
    schedule: &ProviderSchedule,
) -> BookingResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = time::to_instant(date, schedule.start_time(), schedule.timezone())?;
    let end = time::to_instant(date, schedule.end_time(), schedule.timezone())?;
    Ok((start, end))
}

/// Candidate slot starts for `date`, shown in `target`.
///
/// The returned iterator is lazy and finite. It is `Clone`, so a caller can
/// walk the same sequence more than once.
pub fn generate_slots(
    date: NaiveDate,
    schedule: &ProviderSchedule,
    target: Tz,
) -> BookingResult<Slots> {
    let (start, end) = working_window(date, schedule)?;
    let step = schedule.slot_duration();
    let count = slot_count(end - start, step, schedule.trailing());

    tracing::debug!(
        "Generating {} slots for {}: window={}..{}, target={}",
        count,
        date,
        start,
        end,
        target.name()
    );

    Ok(Slots {
        first: start,
        step,
        index: 0,
        count,
        timezone: target,
    })
}

fn slot_count(span: Duration, step: Duration, trailing: TrailingSlot) -> u32 {
    let span = span.num_seconds();
    let step = step.num_seconds();
    if span <= 0 || step <= 0 {
        return 0;
    }

    let count = match trailing {
        TrailingSlot::Exclude => span / step,
        TrailingSlot::Include => (span + step - 1) / step + 1,
    };
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone)]
pub struct Slots {
    first: DateTime<Utc>,
    step: Duration,
    index: u32,
    count: u32,
    timezone: Tz,
}

impl Slots {
    /// Start of the first slot, whether or not it has been yielded yet.
    pub fn first_instant(&self) -> Option<DateTime<Utc>> {
        (self.count > 0).then_some(self.first)
    }

    /// Start of the last slot, whether or not it has been yielded yet.
    pub fn last_instant(&self) -> Option<DateTime<Utc>> {
        self.count
            .checked_sub(1)
            .map(|last| self.first + self.step * last as i32)
    }
}

impl Iterator for Slots {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let instant = self.first + self.step * self.index as i32;
        self.index += 1;
        Some(time::to_wall_clock(instant, self.timezone))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Slots {}
