//! Domain error types
//!
//! [`SyncError`] is the error taxonomy of a synchronization pass. Adapters map
//! their transport failures into one of these kinds at the port boundary so
//! the engine can decide between aborting the pass, backing off, or logging
//! and moving on.

use thiserror::Error;

/// Errors that can occur during a synchronization pass
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The booking source could not be reached or returned a bad response.
    /// Aborts the current pass.
    #[error("Booking source unavailable: {0}")]
    SourceUnavailable(String),

    /// Listing calendars failed. Aborts the current pass.
    #[error("Calendar directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// A calendar or event mutation was rejected by the provider's rate limit.
    /// The same operation is retried after the backoff delay.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other provider-side failure
    #[error("Provider error: {0}")]
    Provider(String),
}

impl SyncError {
    /// Returns true if this error should trigger the backoff-and-retry path
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, SyncError::QuotaExceeded(_))
    }

    /// Returns true if this error aborts the whole pass
    pub fn is_pass_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::SourceUnavailable(_) | SyncError::DirectoryUnavailable(_)
        )
    }
}
