//! Reservation records from the booking source
//!
//! A [`Reservation`] is an immutable snapshot of one registration as returned
//! by the booking API. The booking API is loose about nulls (unassigned
//! reservations come back with `"room": null`, `"room_id": null`), so every
//! scalar field tolerates both a missing key and an explicit `null`.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes `null` as the type's default value
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single reservation from the booking source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Room name, also the name of the room's calendar
    #[serde(default, deserialize_with = "nullable")]
    pub room: String,
    /// Room identifier. `0` means the reservation has no room assigned.
    #[serde(default, deserialize_with = "nullable")]
    pub room_id: i64,
    /// Program the guest is attending (`"Personal Booking"` for B&B stays)
    #[serde(default, deserialize_with = "nullable")]
    pub program: String,
    #[serde(default, deserialize_with = "nullable")]
    pub first_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub last_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, deserialize_with = "nullable")]
    pub nights: i64,
    /// Free-form registration questions, in source order
    #[serde(default, deserialize_with = "nullable")]
    pub questions: serde_json::Map<String, serde_json::Value>,
}

impl Reservation {
    /// Returns true if the reservation has a room assigned
    pub fn is_assigned(&self) -> bool {
        self.room_id != 0
    }

    /// Returns the free-text arrival timeframe answer, if present as a string
    pub fn arrival_timeframe(&self) -> Option<&str> {
        self.questions
            .get("arrival_timeframe")
            .and_then(|v| v.as_str())
    }
}

/// Derives the ordered, de-duplicated list of room names
///
/// Rooms appear in the order of their first reservation. Reservations without
/// a room name contribute nothing.
pub fn derive_room_list(reservations: &[Reservation]) -> Vec<String> {
    let mut rooms: Vec<String> = Vec::new();
    for reservation in reservations {
        if reservation.room.is_empty() {
            continue;
        }
        if !rooms.iter().any(|r| r == &reservation.room) {
            rooms.push(reservation.room.clone());
        }
    }
    rooms
}

/// Stay-date window used when fetching reservations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    /// Earliest stay date (inclusive)
    pub min_stay: NaiveDate,
    /// Latest stay date (inclusive)
    pub max_stay: NaiveDate,
}

impl BookingWindow {
    /// Builds the rolling window `[today - past_days, today + future_months]`
    ///
    /// Month arithmetic clamps to the end of the month (Aug 31 + 6 months is
    /// the last day of February).
    pub fn around(today: NaiveDate, past_days: u32, future_months: u32) -> Self {
        let min_stay = today
            .checked_sub_days(Days::new(u64::from(past_days)))
            .unwrap_or(NaiveDate::MIN);
        let max_stay = today
            .checked_add_months(Months::new(future_months))
            .unwrap_or(NaiveDate::MAX);
        Self { min_stay, max_stay }
    }

    /// `min_stay` formatted as `YYYY-MM-DD`
    pub fn min_stay_param(&self) -> String {
        self.min_stay.format("%Y-%m-%d").to_string()
    }

    /// `max_stay` formatted as `YYYY-MM-DD`
    pub fn max_stay_param(&self) -> String {
        self.max_stay.format("%Y-%m-%d").to_string()
    }
}
