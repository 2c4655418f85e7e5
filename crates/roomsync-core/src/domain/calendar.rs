//! Calendar-side entities
//!
//! [`CalendarRecord`] and [`RemoteEvent`] describe what already exists at the
//! calendar provider. [`CalendarEvent`] is the event roomsync writes; its
//! serde layout matches the provider's event resource so adapters can send
//! it as-is.

use serde::{Deserialize, Serialize};

/// A calendar in the provider's directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRecord {
    /// Provider calendar ID
    pub id: String,
    /// Display name (the room name for room calendars)
    pub name: String,
    /// Whether this is the account's primary calendar
    pub is_primary: bool,
}

/// Looks up a calendar by exact name
pub fn find_calendar<'a>(
    calendars: &'a [CalendarRecord],
    name: &str,
) -> Option<&'a CalendarRecord> {
    calendars.iter().find(|c| c.name == name)
}

/// Returns the primary calendar of the directory, if any
pub fn primary_calendar(calendars: &[CalendarRecord]) -> Option<&CalendarRecord> {
    calendars.iter().find(|c| c.is_primary)
}

/// An event that already exists on a calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEvent {
    /// Provider event ID
    pub id: String,
    /// Event title, empty if the provider returned none
    pub summary: String,
}

/// Local date-time plus IANA zone, as the provider expects them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// `YYYY-MM-DDTHH:MM:SS`, interpreted in `time_zone`
    pub date_time: String,
    pub time_zone: String,
}

/// An event synthesized from a reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub recurrence: Vec<String>,
}
