//! Booking system HTTP client
//!
//! Wraps `reqwest::Client` with the token query parameter and stay-window
//! filters expected by the registrations endpoint.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chrono::Local;
//! use roomsync_booking::client::BookingClient;
//! use roomsync_core::domain::BookingWindow;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = BookingClient::new("api-token-here");
//! let window = BookingWindow::around(Local::now().date_naive(), 3, 6);
//! let reservations = client.fetch_registrations(&window).await?;
//! println!("{} reservations", reservations.len());
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use reqwest::{Client, RequestBuilder};
use roomsync_core::{
    config::BookingConfig,
    domain::{BookingWindow, Reservation, SyncError},
    ports::BookingSource,
};
use tracing::{debug, info, warn};

use crate::BookingError;

/// Default API root of the booking system
const BOOKING_BASE_URL: &str = "https://sunmountaincenter.secure.retreat.guru/api/v1";

/// Longest slice of an error body kept in [`BookingError::Status`]
const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// BookingClient
// ============================================================================

/// HTTP client for the booking system's registrations endpoint
#[derive(Debug, Clone)]
pub struct BookingClient {
    /// The underlying HTTP client
    client: Client,
    /// API root; `/registrations` is appended
    base_url: String,
    /// API token, sent as the `token` query parameter
    token: String,
    /// Value of the `limit` query parameter (0 = no limit)
    limit: u32,
}

impl BookingClient {
    /// Creates a new BookingClient against the default API root
    ///
    /// # Arguments
    /// * `token` - API token for the booking system
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, BOOKING_BASE_URL)
    }

    /// Creates a new BookingClient with a custom base URL (useful for testing)
    ///
    /// # Arguments
    /// * `token` - API token for the booking system
    /// * `base_url` - API root; `/registrations` is appended
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            limit: 0,
        }
    }

    /// Builds a client from configuration, reading the token from the
    /// environment variable named by `config.token_env`.
    pub fn from_config(config: &BookingConfig) -> anyhow::Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BookingError::MissingToken(config.token_env.clone()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build booking HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            limit: config.limit,
        })
    }

    /// Sets the `limit` query parameter
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the registrations request for `window`
    fn registrations_request(&self, window: &BookingWindow) -> RequestBuilder {
        let url = format!("{}/registrations", self.base_url);
        self.client.get(&url).query(&[
            ("token", self.token.clone()),
            ("limit", self.limit.to_string()),
            ("min_stay", window.min_stay_param()),
            ("max_stay", window.max_stay_param()),
        ])
    }

    /// Fetches every registration whose stay overlaps `window`
    ///
    /// Makes a single `GET /registrations` call. No retries. Records that do
    /// not decode (for example a `null` stay date) are logged and skipped;
    /// only a body that is not a JSON array fails the whole fetch.
    pub async fn fetch_registrations(
        &self,
        window: &BookingWindow,
    ) -> Result<Vec<Reservation>, BookingError> {
        debug!(
            min_stay = %window.min_stay_param(),
            max_stay = %window.max_stay_param(),
            "Fetching registrations"
        );

        let response = self.registrations_request(window).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let mut body = body;
            body.truncate(floor_char_boundary(&body, MAX_ERROR_BODY));
            return Err(BookingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let records: Vec<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| BookingError::InvalidResponse(e.to_string()))?;
        let total = records.len();
        let reservations = decode_records(records);

        info!(
            count = reservations.len(),
            skipped = total - reservations.len(),
            "Fetched reservations"
        );
        Ok(reservations)
    }
}

/// Decodes each registration on its own, dropping the ones that fail
fn decode_records(records: Vec<serde_json::Value>) -> Vec<Reservation> {
    records
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, record)| match serde_json::from_value::<Reservation>(record) {
                Ok(reservation) => Some(reservation),
                Err(e) => {
                    warn!(index, error = %e, "Skipping undecodable registration");
                    None
                }
            },
        )
        .collect()
}

/// Largest index `<= max` that sits on a char boundary of `s`
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

#[async_trait::async_trait]
impl BookingSource for BookingClient {
    async fn fetch_reservations(
        &self,
        window: &BookingWindow,
    ) -> Result<Vec<Reservation>, SyncError> {
        self.fetch_registrations(window).await.map_err(|e| {
            warn!(error = %e, "Booking source unavailable");
            SyncError::SourceUnavailable(e.to_string())
        })
    }
}
