//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the sync engine depends on, but whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`BookingSource`] - Reservation feed (`roomsync-booking`)
//! - [`CalendarProvider`] - Calendar directory and event operations (`roomsync-google`)

pub mod booking_source;
pub mod calendar_provider;

pub use booking_source::BookingSource;
pub use calendar_provider::CalendarProvider;
