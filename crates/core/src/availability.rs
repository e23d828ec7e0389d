//! # Availability Filter
//!
//! Removes candidate slots that collide with booked events.
//!
//! A slot is removed when its start instant lies in `[event.start, event.end]`
//! for any event. Both bounds are inclusive, so a slot starting exactly when
//! a booking ends is also hidden. Slots that survive keep their original
//! order.
//!
//! Cost is O(slots × events); both are bounded by one day of one provider's
//! calendar.

use chrono::{DateTime, TimeZone, Utc};

use crate::models::event::BookedEvent;

/// Whether `slot` starts inside `event`, bounds included.
pub fn is_blocked<T: TimeZone>(slot: &DateTime<T>, event: &BookedEvent) -> bool {
    let slot = slot.with_timezone(&Utc);
    event.start <= slot && slot <= event.end
}

/// Keeps the slots not blocked by any of `events`.
pub fn filter_available<I, T>(slots: I, events: &[BookedEvent]) -> Vec<DateTime<T>>
where
    I: IntoIterator<Item = DateTime<T>>,
    T: TimeZone,
{
    slots
        .into_iter()
        .filter(|slot| !events.iter().any(|event| is_blocked(slot, event)))
        .collect()
}
