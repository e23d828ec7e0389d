//! # Eventbook Core
//!
//! Domain logic for a single provider's booking calendar: turning the
//! provider's local working hours into bookable slots, filtering them
//! against booked events, and admitting new bookings without overlap.
//!
//! Nothing in this crate talks to a database directly. Persistence is
//! reached through the [`repository::EventRepository`] trait, which the
//! `eventbook-db` crate implements.

pub mod availability;
pub mod errors;
pub mod models;
pub mod repository;
pub mod service;
pub mod slots;
pub mod time;

pub use errors::{BookingError, BookingResult};
pub use repository::{Admission, EventRepository};
pub use service::BookingService;
