//! Room scheduler - walks the room list one calendar at a time
//!
//! For every room, strictly in order:
//!
//! ```text
//! ensure calendar ──→ list existing events ──→ reconcile ──→ room delay
//!       ──→ next room
//! ```
//!
//! A room whose calendar cannot be created is skipped for this pass; the
//! calendar directory is listed again at the start of the next pass. The
//! cancellation token is checked before every room and during the delay
//! between rooms.

use std::{sync::Arc, time::Duration};

use roomsync_core::{
    domain::{
        calendar::{find_calendar, primary_calendar},
        CalendarRecord, EventSettings, RemoteEvent, Reservation, SyncError,
    },
    ports::CalendarProvider,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    backoff::BackoffPolicy,
    pacing::Pacer,
    reconciler::{EventReconciler, ReconcileReport, Target},
};

/// How a room's calendar was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarResolution {
    /// Present in the directory listing; no create call was made
    Existing(String),
    /// Created during this pass
    Created(String),
    /// Creation failed; the room is skipped this pass
    Skipped,
}

impl CalendarResolution {
    pub fn calendar_id(&self) -> Option<&str> {
        match self {
            CalendarResolution::Existing(id) | CalendarResolution::Created(id) => Some(id),
            CalendarResolution::Skipped => None,
        }
    }
}

/// Counts for one full pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Calendars reconciled
    pub rooms_synced: usize,
    /// Rooms skipped because their calendar could not be created
    pub rooms_skipped: usize,
    /// Calendars created this pass
    pub calendars_created: usize,
    /// Event counts summed over all calendars
    pub events: ReconcileReport,
    /// The pass stopped early on cancellation
    pub cancelled: bool,
}

/// Drives reconciliation across the room calendars of one pass
pub struct RoomScheduler {
    provider: Arc<dyn CalendarProvider>,
    pacer: Arc<Pacer>,
    reconciler: EventReconciler,
    room_delay: Duration,
    cancel: CancellationToken,
}

impl RoomScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    /// * `provider` - Calendar provider
    /// * `pacer` - Shared pacer all provider calls go through
    /// * `settings` - Site values for synthesized events
    /// * `room_delay` - Pause between two rooms
    /// * `cancel` - Shutdown signal
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        pacer: Arc<Pacer>,
        settings: EventSettings,
        room_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let reconciler =
            EventReconciler::new(provider.clone(), pacer.clone(), settings, cancel.clone());
        Self {
            provider,
            pacer,
            reconciler,
            room_delay,
            cancel,
        }
    }

    /// Lets the provider pick up renewed credentials
    ///
    /// A failure is logged and the current credentials stay in use.
    pub async fn refresh_credentials(&self) {
        if let Err(e) = self.provider.refresh_credentials().await {
            warn!(error = %e, "Failed to refresh calendar credentials");
        }
    }

    /// Lists the calendar directory
    ///
    /// Fails with [`SyncError::DirectoryUnavailable`], which aborts the pass.
    pub async fn load_directory(&self) -> Result<Vec<CalendarRecord>, SyncError> {
        let calendars = self.pacer.pace(self.provider.list_calendars()).await?;
        info!(count = calendars.len(), "Calendars in directory");
        Ok(calendars)
    }

    /// Finds the calendar named `room` in `calendars`, or creates it
    ///
    /// A quota rejection escalates `backoff` and waits it out before the
    /// room is skipped for this pass, so the next room does not run straight
    /// back into the rate limit.
    pub async fn ensure_calendar(
        &self,
        room: &str,
        calendars: &[CalendarRecord],
        backoff: &mut BackoffPolicy,
    ) -> CalendarResolution {
        if let Some(existing) = find_calendar(calendars, room) {
            return CalendarResolution::Existing(existing.id.clone());
        }

        match self.pacer.pace(self.provider.insert_calendar(room)).await {
            Ok(created) => {
                info!(room, calendar_id = %created.id, "Calendar created");
                CalendarResolution::Created(created.id)
            }
            Err(e) if e.is_quota_exceeded() => {
                let delay = backoff.on_quota_exceeded();
                warn!(
                    room,
                    delay_secs = delay.as_secs(),
                    error = %e,
                    "Quota exceeded while creating calendar, skipping room"
                );
                self.wait_backoff(delay).await;
                CalendarResolution::Skipped
            }
            Err(e) => {
                warn!(room, error = %e, "Error while creating a calendar, skipping room");
                CalendarResolution::Skipped
            }
        }
    }

    /// Lists the events already on a calendar
    ///
    /// Returns `None` if they could not be listed.
    async fn list_existing(
        &self,
        calendar_id: &str,
        label: &str,
        backoff: &mut BackoffPolicy,
    ) -> Option<Vec<RemoteEvent>> {
        match self.pacer.pace(self.provider.list_events(calendar_id)).await {
            Ok(events) => {
                info!(calendar = label, count = events.len(), "Events found in calendar");
                Some(events)
            }
            Err(e) => {
                warn!(calendar = label, error = %e, "Error while retrieving event list");
                if e.is_quota_exceeded() {
                    self.wait_backoff(backoff.on_quota_exceeded()).await;
                }
                None
            }
        }
    }

    /// Sleeps for a backoff delay, returning early on cancellation
    async fn wait_backoff(&self, delay: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = self.cancel.cancelled() => {}
        }
    }

    /// Reconciles one room's calendar
    pub async fn sync_room(
        &self,
        room: &str,
        calendars: &[CalendarRecord],
        reservations: &[Reservation],
        backoff: &mut BackoffPolicy,
        report: &mut PassReport,
    ) {
        let resolution = self.ensure_calendar(room, calendars, backoff).await;
        let Some(calendar_id) = resolution.calendar_id() else {
            report.rooms_skipped += 1;
            return;
        };
        if matches!(resolution, CalendarResolution::Created(_)) {
            report.calendars_created += 1;
        }

        let existing = self.list_existing(calendar_id, room, backoff).await;
        let events = self
            .reconciler
            .reconcile(
                calendar_id,
                existing.as_deref(),
                reservations,
                Target::Room(room),
                backoff,
            )
            .await;

        report.rooms_synced += 1;
        report.events.absorb(events);
    }

    /// Reconciles every room in `rooms`, in order
    pub async fn sync_rooms(
        &self,
        rooms: &[String],
        calendars: &[CalendarRecord],
        reservations: &[Reservation],
        backoff: &mut BackoffPolicy,
    ) -> PassReport {
        let mut report = PassReport::default();

        for (index, room) in rooms.iter().enumerate() {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            info!(room = %room, index = index + 1, total = rooms.len(), "Syncing room");
            self.sync_room(room, calendars, reservations, backoff, &mut report)
                .await;

            if index + 1 < rooms.len() {
                tokio::select! {
                    _ = tokio::time::sleep(self.room_delay) => {}
                    _ = self.cancel.cancelled() => {}
                }
            }
        }

        if self.cancel.is_cancelled() {
            report.cancelled = true;
        }
        report
    }

    /// Reconciles every assigned reservation onto the primary calendar
    pub async fn sync_primary(
        &self,
        calendars: &[CalendarRecord],
        reservations: &[Reservation],
        backoff: &mut BackoffPolicy,
    ) -> PassReport {
        let mut report = PassReport::default();

        let Some(primary) = primary_calendar(calendars) else {
            error!("No primary calendar in directory");
            report.rooms_skipped = 1;
            return report;
        };

        let existing = self.list_existing(&primary.id, "primary", backoff).await;
        let events = self
            .reconciler
            .reconcile(
                &primary.id,
                existing.as_deref(),
                reservations,
                Target::Primary,
                backoff,
            )
            .await;

        report.rooms_synced = 1;
        report.events = events;
        report.cancelled = self.cancel.is_cancelled();
        report
    }
}
