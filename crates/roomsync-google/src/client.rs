//! Google Calendar API client
//!
//! Provides a typed HTTP client for the handful of Google Calendar v3
//! endpoints roomsync needs. Handles the bearer header, endpoint construction
//! and the classification of error responses.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roomsync_google::client::GoogleCalendarClient;
//!
//! # async fn example() -> Result<(), roomsync_google::GoogleError> {
//! let client = GoogleCalendarClient::new("access-token-here");
//! for calendar in client.list_calendars(50).await? {
//!     println!("{} ({})", calendar.name, calendar.id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Notes
//!
//! - Every method makes exactly one request. There is no retry loop here;
//!   the sync engine paces calls and owns the backoff.
//! - Calendar and event IDs are pushed as URL path segments, so IDs that
//!   contain `#` or `/` are percent-encoded.
//! - The access token is shared between clones and can be replaced while
//!   the client is in use (see [`GoogleCalendarClient::set_access_token`]).

use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use roomsync_core::{
    config::CalendarConfig,
    domain::{CalendarEvent, CalendarRecord, RemoteEvent},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{token::load_access_token, GoogleError, PERMISSION_REASONS};

/// Base URL for Google Calendar API v3
const CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

// ============================================================================
// Calendar API response types
// ============================================================================

/// Response from `GET /users/me/calendarList`
#[derive(Debug, Deserialize)]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

/// One entry of the calendar list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListEntry {
    id: String,
    summary: Option<String>,
    primary: Option<bool>,
}

impl From<CalendarListEntry> for CalendarRecord {
    fn from(entry: CalendarListEntry) -> Self {
        CalendarRecord {
            id: entry.id,
            name: entry.summary.unwrap_or_default(),
            is_primary: entry.primary.unwrap_or(false),
        }
    }
}

/// Response from `POST /calendars`
#[derive(Debug, Deserialize)]
struct CalendarResource {
    id: String,
    summary: Option<String>,
}

/// Body of `POST /calendars`
#[derive(Debug, Serialize)]
struct NewCalendar<'a> {
    summary: &'a str,
}

/// Response from `GET /calendars/{id}/events`
#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<EventResource>,
}

/// An event resource (only the fields roomsync reads)
#[derive(Debug, Deserialize)]
struct EventResource {
    id: String,
    summary: Option<String>,
}

impl From<EventResource> for RemoteEvent {
    fn from(event: EventResource) -> Self {
        RemoteEvent {
            id: event.id,
            summary: event.summary.unwrap_or_default(),
        }
    }
}

/// Google's JSON error envelope: `{"error": {"code", "message", "errors": [...]}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}

// ============================================================================
// Error classification
// ============================================================================

/// Turns a non-success status and its body into a [`GoogleError`]
///
/// HTTP 429 is always a rate limit. HTTP 403 is a rate limit unless Google
/// reports one of the [`PERMISSION_REASONS`].
pub fn classify_error(status: StatusCode, body: &str) -> GoogleError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let reason = envelope
        .as_ref()
        .and_then(|e| e.error.errors.first())
        .map(|d| d.reason.clone())
        .unwrap_or_default();
    let message = match &envelope {
        Some(e) if !reason.is_empty() => format!("{}: {}", reason, e.error.message),
        Some(e) => e.error.message.clone(),
        None => body.trim().to_string(),
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => GoogleError::RateLimited {
            status: status.as_u16(),
            message,
        },
        StatusCode::FORBIDDEN if PERMISSION_REASONS.contains(&reason.as_str()) => {
            GoogleError::Forbidden(message)
        }
        StatusCode::FORBIDDEN => GoogleError::RateLimited {
            status: status.as_u16(),
            message,
        },
        StatusCode::UNAUTHORIZED => GoogleError::Unauthorized(message),
        StatusCode::NOT_FOUND => GoogleError::NotFound(message),
        StatusCode::GONE => GoogleError::Gone(message),
        s if s.is_server_error() => GoogleError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => GoogleError::Api {
            status: s.as_u16(),
            message,
        },
    }
}

// ============================================================================
// GoogleCalendarClient
// ============================================================================

/// HTTP client for Google Calendar API calls
///
/// Wraps `reqwest::Client` with authentication headers and base URL
/// construction for the Calendar v3 API.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: String,
    /// Current OAuth2 access token, shared with clones
    access_token: Arc<RwLock<String>>,
}

impl GoogleCalendarClient {
    /// Creates a new client with the given access token
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token with calendar scope
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, CALENDAR_BASE_URL)
    }

    /// Creates a new client with a custom base URL (useful for testing)
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token
    /// * `base_url` - Custom base URL for API requests
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            access_token: Arc::new(RwLock::new(access_token.into())),
        }
    }

    /// Builds a client from configuration
    ///
    /// Reads the access token from `config.token_file` and applies the
    /// configured request timeout.
    pub fn from_config(config: &CalendarConfig) -> anyhow::Result<Self> {
        let access_token = load_access_token(&config.token_file)?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build calendar HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            access_token: Arc::new(RwLock::new(access_token)),
        })
    }

    /// Updates the access token (e.g., after the token file was renewed)
    ///
    /// # Arguments
    /// * `token` - The new access token
    pub fn set_access_token(&self, token: impl Into<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token.into();
        debug!("Updated calendar client access token");
    }

    /// Returns the current access token
    pub fn access_token(&self) -> String {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL for the given path segments under the base URL
    ///
    /// Each segment is percent-encoded as a single path component.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, GoogleError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `segments` - Path segments relative to the base URL
    pub fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, GoogleError> {
        let url = self.endpoint(segments)?;
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(self.access_token()))
    }

    /// Sends a request and returns the response, classifying error statuses
    async fn send(&self, request: RequestBuilder) -> Result<Response, GoogleError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &body))
    }

    /// Sends a request and decodes a JSON response body
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GoogleError> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| GoogleError::InvalidResponse(e.to_string()))
    }

    /// Lists the calendars in the account's calendar list (one page)
    ///
    /// Makes `GET /users/me/calendarList?maxResults={max_results}`.
    pub async fn list_calendars(
        &self,
        max_results: u32,
    ) -> Result<Vec<CalendarRecord>, GoogleError> {
        debug!(max_results, "Listing calendars");

        let request = self
            .request(Method::GET, &["users", "me", "calendarList"])?
            .query(&[("maxResults", max_results.to_string())]);
        let list: CalendarListResponse = self.send_json(request).await?;

        Ok(list.items.into_iter().map(CalendarRecord::from).collect())
    }

    /// Lists the events of a calendar (one page)
    ///
    /// Recurring events are expanded into single instances and ordered by
    /// start time.
    ///
    /// # Arguments
    /// * `calendar_id` - Provider calendar ID
    /// * `max_results` - Page size
    pub async fn list_events(
        &self,
        calendar_id: &str,
        max_results: u32,
    ) -> Result<Vec<RemoteEvent>, GoogleError> {
        debug!(calendar_id, max_results, "Listing events");

        let request = self
            .request(Method::GET, &["calendars", calendar_id, "events"])?
            .query(&[
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]);
        let events: EventsResponse = self.send_json(request).await?;

        Ok(events.items.into_iter().map(RemoteEvent::from).collect())
    }

    /// Creates a secondary calendar named `summary`
    pub async fn insert_calendar(&self, summary: &str) -> Result<CalendarRecord, GoogleError> {
        debug!(summary, "Creating calendar");

        let request = self
            .request(Method::POST, &["calendars"])?
            .json(&NewCalendar { summary });
        let created: CalendarResource = self.send_json(request).await?;

        Ok(CalendarRecord {
            id: created.id,
            name: created.summary.unwrap_or_else(|| summary.to_string()),
            is_primary: false,
        })
    }

    /// Creates an event and returns its ID
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<String, GoogleError> {
        debug!(calendar_id, summary = %event.summary, "Inserting event");

        let request = self
            .request(Method::POST, &["calendars", calendar_id, "events"])?
            .json(event);
        let created: EventResource = self.send_json(request).await?;

        Ok(created.id)
    }

    /// Deletes an event
    ///
    /// Returns [`GoogleError::NotFound`] or [`GoogleError::Gone`] if the event
    /// does not exist any more.
    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), GoogleError> {
        debug!(calendar_id, event_id, "Deleting event");

        let request = self.request(
            Method::DELETE,
            &["calendars", calendar_id, "events", event_id],
        )?;
        self.send(request).await?;
        Ok(())
    }
}
