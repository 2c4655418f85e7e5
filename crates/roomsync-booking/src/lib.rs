//! roomsync booking - reservation feed client
//!
//! Fetches room reservations from the retreat booking system's
//! `/registrations` endpoint and exposes them through the
//! [`roomsync_core::ports::BookingSource`] port.
//!
//! ## Modules
//!
//! - [`client`] - HTTP client for the registrations endpoint

pub mod client;

use thiserror::Error;

/// Errors that can occur when talking to the booking system
#[derive(Debug, Error)]
pub enum BookingError {
    /// The API token environment variable is missing or empty
    #[error("Missing API token: environment variable {0} is not set")]
    MissingToken(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response body was not a reservation array
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
