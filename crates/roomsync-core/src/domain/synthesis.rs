//! Event synthesis
//!
//! Maps one [`Reservation`] to the [`CalendarEvent`] that represents it. The
//! mapping is a pure function of the reservation and the site settings, so
//! regenerating the events of a room on every pass yields identical output
//! for unchanged reservations.

use chrono::{Days, NaiveDate};
use serde_json::Value;

use super::calendar::{CalendarEvent, EventDateTime};
use super::reservation::Reservation;

/// Program name the booking source uses for bed & breakfast stays
pub const PERSONAL_BOOKING: &str = "Personal Booking";

/// Check-in hour used when the arrival timeframe is missing or unrecognized
const DEFAULT_CHECK_IN: (u32, u32) = (13, 0);

/// Arrival timeframe codes (matched as prefixes) and their check-in times
const CHECK_IN_TIMES: &[(&str, (u32, u32))] = &[
    ("200", (13, 0)),
    ("230", (13, 30)),
    ("300", (14, 0)),
    ("330", (14, 30)),
];

/// Hour of the checkout marker placed on the night before `end_date`
const CHECK_OUT_HOUR: u32 = 23;

/// Site-wide values stamped on every event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSettings {
    /// Street address of the venue
    pub location: String,
    /// IANA time zone of the venue
    pub time_zone: String,
}

/// Builds the calendar event for a reservation
pub fn synthesize_event(reservation: &Reservation, settings: &EventSettings) -> CalendarEvent {
    CalendarEvent {
        summary: summary(reservation),
        location: settings.location.clone(),
        description: description(reservation),
        start: EventDateTime {
            date_time: start_date_time(reservation),
            time_zone: settings.time_zone.clone(),
        },
        end: EventDateTime {
            date_time: end_date_time(reservation),
            time_zone: settings.time_zone.clone(),
        },
        recurrence: Vec::new(),
    }
}

/// Event title: B&B stays omit the program name
pub fn summary(reservation: &Reservation) -> String {
    if reservation.program == PERSONAL_BOOKING {
        format!(
            "{} - {} {} for B&B",
            reservation.room, reservation.first_name, reservation.last_name
        )
    } else {
        format!(
            "{} - {} - {} {} for retreats",
            reservation.room, reservation.program, reservation.first_name, reservation.last_name
        )
    }
}

/// Event body: night count followed by one line per answered question
///
/// Questions whose answer is empty, `null`, or structured (object/array) are
/// left out.
pub fn description(reservation: &Reservation) -> String {
    let plural = if reservation.nights > 1 { "s" } else { "" };
    let mut text = format!("{} Night{}", reservation.nights, plural);

    for (key, value) in &reservation.questions {
        if let Some(rendered) = render_answer(value) {
            text.push('\n');
            text.push_str(&format_key(key));
            text.push_str(": ");
            text.push_str(&rendered);
        }
    }

    text
}

fn render_answer(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Turns a question key into a label: `arrival_timeframe` → `Arrival Timeframe`
pub fn format_key(key: &str) -> String {
    title_case(&key.replace('_', " "))
}

/// Upper-cases the first word character of each whitespace-separated word
/// and lower-cases the rest of the word.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_whitespace() {
            in_word = false;
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else if c.is_alphanumeric() || c == '_' {
            in_word = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Check-in `(hour, minute)` for a free-text arrival timeframe answer
pub fn check_in_time(arrival_timeframe: Option<&str>) -> (u32, u32) {
    arrival_timeframe
        .and_then(|answer| {
            CHECK_IN_TIMES
                .iter()
                .find(|(code, _)| answer.starts_with(code))
                .map(|(_, time)| *time)
        })
        .unwrap_or(DEFAULT_CHECK_IN)
}

/// Local start: `start_date` at the inferred check-in time
pub fn start_date_time(reservation: &Reservation) -> String {
    let (hour, minute) = check_in_time(reservation.arrival_timeframe());
    local_date_time(reservation.start_date, hour, minute)
}

/// Local end: the day before `end_date`, at 23:00
pub fn end_date_time(reservation: &Reservation) -> String {
    let day_before = reservation
        .end_date
        .checked_sub_days(Days::new(1))
        .unwrap_or(reservation.end_date);
    local_date_time(day_before, CHECK_OUT_HOUR, 0)
}

fn local_date_time(date: NaiveDate, hour: u32, minute: u32) -> String {
    format!("{}T{:02}:{:02}:00", date.format("%Y-%m-%d"), hour, minute)
}
