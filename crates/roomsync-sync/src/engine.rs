//! Sync loop - periodic reservation to calendar passes
//!
//! One pass:
//!
//! 1. Fetch reservations for the rolling stay window
//! 2. Derive the room list
//! 3. Refresh provider credentials, then list the calendar directory
//! 4. Reconcile every room calendar (or the primary calendar) in order
//!
//! A pass that fails at step 1 or 3 is logged and abandoned. Either way the
//! loop then waits the full interval and starts over, until cancelled.
//!
//! ## Design Notes
//!
//! - The loop owns the [`BackoffPolicy`] and lends it to the scheduler, so
//!   the escalated delay carries over from one pass to the next.
//! - All provider calls, including the directory listing, share one [`Pacer`].

use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDate};
use roomsync_core::{
    config::{Config, SyncMode},
    domain::{derive_room_list, BookingWindow, SyncError},
    ports::{BookingSource, CalendarProvider},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    backoff::BackoffPolicy,
    pacing::Pacer,
    scheduler::{PassReport, RoomScheduler},
};

/// Periodic sync driver
pub struct SyncLoop {
    source: Arc<dyn BookingSource>,
    scheduler: RoomScheduler,
    backoff: BackoffPolicy,
    mode: SyncMode,
    past_days: u32,
    future_months: u32,
    interval: Duration,
    cancel: CancellationToken,
}

impl SyncLoop {
    /// Creates a new sync loop from configuration
    ///
    /// # Arguments
    /// * `source` - Reservation feed
    /// * `provider` - Calendar provider
    /// * `config` - Loaded configuration
    /// * `cancel` - Shutdown signal, observed between passes, between rooms
    ///   and during every wait
    pub fn new(
        source: Arc<dyn BookingSource>,
        provider: Arc<dyn CalendarProvider>,
        config: &Config,
        cancel: CancellationToken,
    ) -> Self {
        let pacer = Arc::new(Pacer::from_config(&config.pacing));
        let scheduler = RoomScheduler::new(
            provider,
            pacer,
            config.calendar.event_settings(),
            config.pacing.room_delay(),
            cancel.clone(),
        );

        Self {
            source,
            scheduler,
            backoff: BackoffPolicy::from_config(&config.pacing),
            mode: config.sync.mode,
            past_days: config.booking.past_days,
            future_months: config.booking.future_months,
            interval: config.sync.interval(),
            cancel,
        }
    }

    /// Current backoff state
    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Runs one pass with `today` as the centre of the stay window
    ///
    /// Fails with [`SyncError::SourceUnavailable`] or
    /// [`SyncError::DirectoryUnavailable`]; per-room problems are logged and
    /// counted in the returned report instead.
    pub async fn run_pass(&mut self, today: NaiveDate) -> Result<PassReport, SyncError> {
        let window = BookingWindow::around(today, self.past_days, self.future_months);
        info!(
            min_stay = %window.min_stay_param(),
            max_stay = %window.max_stay_param(),
            mode = ?self.mode,
            "Calendar sync pass started"
        );

        let reservations = self.source.fetch_reservations(&window).await?;
        info!(count = reservations.len(), "Registrations fetched");

        self.scheduler.refresh_credentials().await;
        let calendars = self.scheduler.load_directory().await?;

        let report = match self.mode {
            SyncMode::Rooms => {
                let rooms = derive_room_list(&reservations);
                info!(count = rooms.len(), "Rooms to sync");
                self.scheduler
                    .sync_rooms(&rooms, &calendars, &reservations, &mut self.backoff)
                    .await
            }
            SyncMode::Primary => {
                self.scheduler
                    .sync_primary(&calendars, &reservations, &mut self.backoff)
                    .await
            }
        };

        info!(
            rooms_synced = report.rooms_synced,
            rooms_skipped = report.rooms_skipped,
            calendars_created = report.calendars_created,
            deleted = report.events.deleted,
            created = report.events.created,
            failed = report.events.failed,
            backoff_secs = self.backoff.current().as_secs(),
            "Calendar sync pass finished"
        );
        Ok(report)
    }

    /// Runs exactly one pass for the current local date
    pub async fn run_once(&mut self) -> Result<PassReport, SyncError> {
        self.run_pass(Local::now().date_naive()).await
    }

    /// Runs passes until cancelled, waiting the full interval after each one
    /// whether it succeeded or not
    pub async fn run(&mut self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            if let Err(e) = self.run_once().await {
                error!(error = %e, "Sync pass failed");
            }

            if self.cancel.is_cancelled() {
                break;
            }

            info!(
                minutes = self.interval.as_secs() / 60,
                "Next update scheduled"
            );
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.cancel.cancelled() => break,
            }
        }

        info!("Sync loop stopped");
    }
}
