//! Calendar provider port (driven/secondary port)
//!
//! This module defines the interface for the calendar service that hosts one
//! calendar per room. The primary implementation targets Google Calendar,
//! but nothing here is provider-specific.
//!
//! ## Design Notes
//!
//! - Errors are classified [`SyncError`] values rather than `anyhow::Error`:
//!   the engine has to tell rate-limit rejections (back off and retry) from
//!   other failures (log and move on).
//! - Implementations make exactly one HTTP request per call. Pacing and
//!   retries are the engine's job.

use crate::domain::{CalendarEvent, CalendarRecord, RemoteEvent, SyncError};

/// Port trait for calendar provider operations
#[async_trait::async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Picks up renewed credentials before a pass
    ///
    /// Called once per pass, before the directory listing. The default does
    /// nothing; a failure leaves the current credentials in use.
    async fn refresh_credentials(&self) -> Result<(), SyncError> {
        Ok(())
    }

    /// Lists the calendars visible to the account (a single page)
    ///
    /// Fails with [`SyncError::DirectoryUnavailable`].
    async fn list_calendars(&self) -> Result<Vec<CalendarRecord>, SyncError>;

    /// Lists the events of a calendar (a single page, ordered by start time,
    /// recurring events expanded into instances)
    async fn list_events(&self, calendar_id: &str) -> Result<Vec<RemoteEvent>, SyncError>;

    /// Creates a new calendar named `name`
    async fn insert_calendar(&self, name: &str) -> Result<CalendarRecord, SyncError>;

    /// Creates an event and returns its provider ID
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<String, SyncError>;

    /// Deletes an event. Deleting an event that no longer exists succeeds.
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), SyncError>;
}
