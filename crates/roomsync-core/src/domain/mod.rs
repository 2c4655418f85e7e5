//! Domain entities and pure domain functions
//!
//! Nothing in this module performs I/O.

pub mod calendar;
pub mod errors;
pub mod reservation;
pub mod synthesis;

pub use calendar::{CalendarEvent, CalendarRecord, EventDateTime, RemoteEvent};
pub use errors::SyncError;
pub use reservation::{derive_room_list, BookingWindow, Reservation};
pub use synthesis::{synthesize_event, EventSettings};
