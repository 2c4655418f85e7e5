//! roomsync Google - Google Calendar API client
//!
//! Provides async client for:
//! - Listing the account's calendar directory
//! - Creating room calendars
//! - Listing, inserting and deleting events
//!
//! ## Modules
//!
//! - [`client`] - Google Calendar v3 HTTP client
//! - [`provider`] - [`roomsync_core::ports::CalendarProvider`] implementation
//! - [`token`] - Access token loading

pub mod client;
pub mod provider;
pub mod token;

use thiserror::Error;

/// Error reasons Google reports on a 403 that are permission problems
/// rather than usage limits
pub const PERMISSION_REASONS: &[&str] =
    &["forbidden", "insufficientPermissions", "requiredAccessLevel"];

/// Errors that can occur when communicating with the Google Calendar API
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Rate limit or usage quota exceeded (HTTP 429, or 403 with a usage reason)
    #[error("Rate limited (HTTP {status}): {message}")]
    RateLimited {
        /// HTTP status code (429 or 403)
        status: u16,
        /// Error reason and message reported by Google
        message: String,
    },

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested resource has been deleted
    #[error("Gone: {0}")]
    Gone(String),

    /// A server-side error occurred (5xx)
    #[error("Server error (HTTP {status}): {message}")]
    ServerError {
        status: u16,
        message: String,
    },

    /// Any other non-success status
    #[error("HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// An endpoint URL could not be built from the base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GoogleError {
    /// Returns true for rejections the caller should back off from
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GoogleError::RateLimited { .. })
    }

    /// Returns true when the target resource no longer exists
    pub fn is_missing(&self) -> bool {
        matches!(self, GoogleError::NotFound(_) | GoogleError::Gone(_))
    }
}
