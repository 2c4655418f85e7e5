//! In-memory port implementations for engine tests
//!
//! Both mocks record every call (with the tokio clock, so paused-time tests
//! can measure gaps) and can be scripted to fail.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use chrono::NaiveDate;
use roomsync_core::{
    domain::{BookingWindow, CalendarEvent, CalendarRecord, RemoteEvent, Reservation, SyncError},
    ports::{BookingSource, CalendarProvider},
};
use tokio::time::Instant;

/// Builds an assigned (or, with `room_id == 0`, unassigned) reservation
pub fn reservation(room: &str, room_id: i64, first_name: &str) -> Reservation {
    Reservation {
        room: room.to_string(),
        room_id,
        program: "Yoga Retreat".to_string(),
        first_name: first_name.to_string(),
        last_name: "Guest".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        nights: 3,
        questions: serde_json::Map::new(),
    }
}

// ============================================================================
// MockCalendar
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ListCalendars,
    ListEvents { calendar_id: String },
    InsertCalendar { name: String },
    InsertEvent { calendar_id: String, summary: String },
    DeleteEvent { calendar_id: String, event_id: String },
}

impl ProviderCall {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            ProviderCall::InsertCalendar { .. }
                | ProviderCall::InsertEvent { .. }
                | ProviderCall::DeleteEvent { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: ProviderCall,
    pub at: Instant,
}

/// Scripted failure: returned for the next `remaining` matching calls
#[derive(Debug, Clone)]
struct Failure {
    error: SyncError,
    remaining: usize,
}

impl Failure {
    fn take(slot: &mut Option<Failure>) -> Option<SyncError> {
        let failure = slot.as_mut()?;
        if failure.remaining == 0 {
            return None;
        }
        failure.remaining -= 1;
        Some(failure.error.clone())
    }
}

#[derive(Debug, Default)]
pub struct MockCalendar {
    calendars: Mutex<Vec<CalendarRecord>>,
    events: Mutex<HashMap<String, Vec<RemoteEvent>>>,
    calls: Mutex<Vec<RecordedCall>>,
    inserted: Mutex<Vec<(String, CalendarEvent)>>,
    next_id: Mutex<usize>,
    refreshes: Mutex<usize>,
    refresh_failure: Mutex<Option<Failure>>,
    list_calendars_failure: Mutex<Option<Failure>>,
    list_events_failure: Mutex<Option<Failure>>,
    insert_calendar_failure: Mutex<Option<Failure>>,
    insert_event_failure: Mutex<Option<Failure>>,
    delete_failures: Mutex<HashMap<String, Failure>>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar(self, id: &str, name: &str, is_primary: bool) -> Self {
        self.calendars.lock().unwrap().push(CalendarRecord {
            id: id.to_string(),
            name: name.to_string(),
            is_primary,
        });
        self
    }

    pub fn with_events(self, calendar_id: &str, ids: &[&str]) -> Self {
        let events = ids
            .iter()
            .map(|id| RemoteEvent {
                id: id.to_string(),
                summary: format!("old {id}"),
            })
            .collect();
        self.events
            .lock()
            .unwrap()
            .insert(calendar_id.to_string(), events);
        self
    }

    pub fn fail_refresh(&self, error: SyncError, times: usize) {
        *self.refresh_failure.lock().unwrap() = Some(Failure { error, remaining: times });
    }

    pub fn fail_list_calendars(&self, error: SyncError, times: usize) {
        *self.list_calendars_failure.lock().unwrap() = Some(Failure { error, remaining: times });
    }

    pub fn fail_list_events(&self, error: SyncError, times: usize) {
        *self.list_events_failure.lock().unwrap() = Some(Failure { error, remaining: times });
    }

    pub fn fail_insert_calendar(&self, error: SyncError, times: usize) {
        *self.insert_calendar_failure.lock().unwrap() = Some(Failure { error, remaining: times });
    }

    pub fn fail_insert(&self, error: SyncError, times: usize) {
        *self.insert_event_failure.lock().unwrap() = Some(Failure { error, remaining: times });
    }

    pub fn fail_delete(&self, event_id: &str, error: SyncError, times: usize) {
        self.delete_failures
            .lock()
            .unwrap()
            .insert(event_id.to_string(), Failure { error, remaining: times });
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(RecordedCall {
            call,
            at: Instant::now(),
        });
    }

    /// Number of credential refreshes, including failed ones
    pub fn refresh_count(&self) -> usize {
        *self.refreshes.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Event IDs of every delete attempt, in order
    pub fn deleted_events(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c.call {
                ProviderCall::DeleteEvent { event_id, .. } => Some(event_id),
                _ => None,
            })
            .collect()
    }

    /// Successfully inserted events with their calendar IDs
    pub fn inserted_events(&self) -> Vec<(String, CalendarEvent)> {
        self.inserted.lock().unwrap().clone()
    }

    pub fn insert_attempts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c.call, ProviderCall::InsertEvent { .. }))
            .count()
    }

    /// Names passed to every create-calendar attempt
    pub fn created_calendars(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c.call {
                ProviderCall::InsertCalendar { name } => Some(name),
                _ => None,
            })
            .collect()
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{prefix}-{next}")
    }
}

#[async_trait::async_trait]
impl CalendarProvider for MockCalendar {
    async fn refresh_credentials(&self) -> Result<(), SyncError> {
        *self.refreshes.lock().unwrap() += 1;
        if let Some(error) = Failure::take(&mut self.refresh_failure.lock().unwrap()) {
            return Err(error);
        }
        Ok(())
    }

    async fn list_calendars(&self) -> Result<Vec<CalendarRecord>, SyncError> {
        self.record(ProviderCall::ListCalendars);
        if let Some(error) = Failure::take(&mut self.list_calendars_failure.lock().unwrap()) {
            return Err(error);
        }
        Ok(self.calendars.lock().unwrap().clone())
    }

    async fn list_events(&self, calendar_id: &str) -> Result<Vec<RemoteEvent>, SyncError> {
        self.record(ProviderCall::ListEvents {
            calendar_id: calendar_id.to_string(),
        });
        if let Some(error) = Failure::take(&mut self.list_events_failure.lock().unwrap()) {
            return Err(error);
        }
        Ok(self
            .events
            .lock()
            .unwrap()
            .get(calendar_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_calendar(&self, name: &str) -> Result<CalendarRecord, SyncError> {
        self.record(ProviderCall::InsertCalendar {
            name: name.to_string(),
        });
        if let Some(error) = Failure::take(&mut self.insert_calendar_failure.lock().unwrap()) {
            return Err(error);
        }
        let record = CalendarRecord {
            id: self.next_id("cal"),
            name: name.to_string(),
            is_primary: false,
        };
        self.calendars.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<String, SyncError> {
        self.record(ProviderCall::InsertEvent {
            calendar_id: calendar_id.to_string(),
            summary: event.summary.clone(),
        });
        if let Some(error) = Failure::take(&mut self.insert_event_failure.lock().unwrap()) {
            return Err(error);
        }
        let id = self.next_id("event");
        self.inserted
            .lock()
            .unwrap()
            .push((calendar_id.to_string(), event.clone()));
        self.events
            .lock()
            .unwrap()
            .entry(calendar_id.to_string())
            .or_default()
            .push(RemoteEvent {
                id: id.clone(),
                summary: event.summary.clone(),
            });
        Ok(id)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), SyncError> {
        self.record(ProviderCall::DeleteEvent {
            calendar_id: calendar_id.to_string(),
            event_id: event_id.to_string(),
        });
        {
            let mut failures = self.delete_failures.lock().unwrap();
            if let Some(failure) = failures.get_mut(event_id) {
                if failure.remaining > 0 {
                    failure.remaining -= 1;
                    return Err(failure.error.clone());
                }
            }
        }
        if let Some(events) = self.events.lock().unwrap().get_mut(calendar_id) {
            events.retain(|e| e.id != event_id);
        }
        Ok(())
    }
}

// ============================================================================
// MockBooking
// ============================================================================

/// Booking source returning scripted responses, then the last one forever
#[derive(Debug)]
pub struct MockBooking {
    responses: Mutex<VecDeque<Result<Vec<Reservation>, SyncError>>>,
    last: Mutex<Result<Vec<Reservation>, SyncError>>,
    windows: Mutex<Vec<BookingWindow>>,
}

impl MockBooking {
    pub fn returning(reservations: Vec<Reservation>) -> Self {
        Self::scripted(vec![Ok(reservations)])
    }

    pub fn scripted(responses: Vec<Result<Vec<Reservation>, SyncError>>) -> Self {
        let last = responses.last().cloned().unwrap_or_else(|| Ok(Vec::new()));
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(last),
            windows: Mutex::new(Vec::new()),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.windows.lock().unwrap().len()
    }

    pub fn windows(&self) -> Vec<BookingWindow> {
        self.windows.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BookingSource for MockBooking {
    async fn fetch_reservations(
        &self,
        window: &BookingWindow,
    ) -> Result<Vec<Reservation>, SyncError> {
        self.windows.lock().unwrap().push(*window);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => self.last.lock().unwrap().clone(),
        }
    }
}
