//! GoogleCalendarProvider - CalendarProvider implementation for Google Calendar
//!
//! Adapts [`GoogleCalendarClient`] to the [`CalendarProvider`] port and maps
//! [`GoogleError`] onto the engine's [`SyncError`] classes:
//!
//! | Google outcome                        | SyncError              |
//! |---------------------------------------|------------------------|
//! | any failure listing calendars         | `DirectoryUnavailable` |
//! | 429, or 403 with a usage reason       | `QuotaExceeded`        |
//! | 404 / 410 on delete                   | success                |
//! | anything else                         | `Provider`             |
//!
//! A provider built from configuration re-reads its token file before every
//! pass, so a token renewed by an external tool is picked up without a
//! restart.

use std::path::PathBuf;

use roomsync_core::{
    config::CalendarConfig,
    domain::{CalendarEvent, CalendarRecord, RemoteEvent, SyncError},
    ports::CalendarProvider,
};
use tracing::{debug, info};

use crate::{client::GoogleCalendarClient, token::load_access_token, GoogleError};

/// Calendar provider implementation that delegates to the Google Calendar API
#[derive(Debug, Clone)]
pub struct GoogleCalendarProvider {
    client: GoogleCalendarClient,
    /// `maxResults` for the calendar list
    calendar_page_size: u32,
    /// `maxResults` for event lists
    event_page_size: u32,
    /// Token file re-read by `refresh_credentials`
    token_file: Option<PathBuf>,
}

impl GoogleCalendarProvider {
    /// Creates a provider with the default page sizes (50 calendars, 200 events)
    pub fn new(client: GoogleCalendarClient) -> Self {
        Self {
            client,
            calendar_page_size: 50,
            event_page_size: 200,
            token_file: None,
        }
    }

    /// Builds the client from configuration and wraps it
    pub fn from_config(config: &CalendarConfig) -> anyhow::Result<Self> {
        let client = GoogleCalendarClient::from_config(config)?;
        let mut provider = Self::new(client)
            .with_page_sizes(config.calendar_page_size, config.event_page_size);
        provider.token_file = Some(config.token_file.clone());
        Ok(provider)
    }

    /// Overrides the list page sizes
    pub fn with_page_sizes(mut self, calendar_page_size: u32, event_page_size: u32) -> Self {
        self.calendar_page_size = calendar_page_size;
        self.event_page_size = event_page_size;
        self
    }

    /// Returns the underlying client
    pub fn client(&self) -> &GoogleCalendarClient {
        &self.client
    }
}

/// Maps a Google error from an event or calendar call onto a [`SyncError`]
fn to_sync_error(err: GoogleError) -> SyncError {
    if err.is_rate_limited() {
        SyncError::QuotaExceeded(err.to_string())
    } else {
        SyncError::Provider(err.to_string())
    }
}

#[async_trait::async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn refresh_credentials(&self) -> Result<(), SyncError> {
        let Some(path) = &self.token_file else {
            return Ok(());
        };
        let token = load_access_token(path).map_err(|e| SyncError::Provider(format!("{e:#}")))?;
        if token != self.client.access_token() {
            self.client.set_access_token(token);
            info!(token_file = %path.display(), "Reloaded calendar access token");
        }
        Ok(())
    }

    async fn list_calendars(&self) -> Result<Vec<CalendarRecord>, SyncError> {
        self.client
            .list_calendars(self.calendar_page_size)
            .await
            .map_err(|e| SyncError::DirectoryUnavailable(e.to_string()))
    }

    async fn list_events(&self, calendar_id: &str) -> Result<Vec<RemoteEvent>, SyncError> {
        self.client
            .list_events(calendar_id, self.event_page_size)
            .await
            .map_err(to_sync_error)
    }

    async fn insert_calendar(&self, name: &str) -> Result<CalendarRecord, SyncError> {
        self.client.insert_calendar(name).await.map_err(to_sync_error)
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<String, SyncError> {
        self.client
            .insert_event(calendar_id, event)
            .await
            .map_err(to_sync_error)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), SyncError> {
        match self.client.delete_event(calendar_id, event_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_missing() => {
                debug!(calendar_id, event_id, "Event already gone");
                Ok(())
            }
            Err(e) => Err(to_sync_error(e)),
        }
    }
}
