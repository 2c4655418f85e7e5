//! Booking source port (driven/secondary port)
//!
//! Interface for fetching reservations from the booking system.

use crate::domain::{BookingWindow, Reservation, SyncError};

/// Port trait for the reservation feed
///
/// ## Implementation Notes
///
/// - Implementations must not retry. A failure aborts the current pass and
///   the sync loop simply waits for the next one.
/// - Every failure (network, non-2xx status, undecodable body) maps to
///   [`SyncError::SourceUnavailable`].
#[async_trait::async_trait]
pub trait BookingSource: Send + Sync {
    /// Fetches all reservations whose stay overlaps `window`
    async fn fetch_reservations(
        &self,
        window: &BookingWindow,
    ) -> Result<Vec<Reservation>, SyncError>;
}
