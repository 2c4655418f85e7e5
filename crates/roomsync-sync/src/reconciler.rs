//! Event reconciler - replaces a calendar's events with freshly synthesized ones
//!
//! Reservations carry no stable external ID that could serve as a merge key,
//! so reconciliation is delete-then-recreate:
//!
//! 1. **Delete phase**: every existing event is deleted, one at a time.
//! 2. **Build phase**: one event is synthesized and inserted per selected
//!    reservation, one at a time.
//!
//! Every call goes through the shared [`Pacer`]. A quota rejection escalates
//! the [`BackoffPolicy`], waits, and retries the *same* call; a success
//! decays it. Any other error is logged and counted, and the reconciler
//! moves on to the next event.

use std::{future::Future, sync::Arc};

use roomsync_core::{
    domain::{synthesize_event, EventSettings, RemoteEvent, Reservation, SyncError},
    ports::CalendarProvider,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{backoff::BackoffPolicy, pacing::Pacer};

/// Which reservations belong on a calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// Reservations whose `room` equals this name
    Room(&'a str),
    /// Every reservation, regardless of room
    Primary,
}

impl Target<'_> {
    /// Label used in log lines
    pub fn label(&self) -> &str {
        match self {
            Target::Room(name) => name,
            Target::Primary => "primary",
        }
    }
}

/// Selects the reservations to write to a calendar
///
/// Reservations with no room assigned (`room_id == 0`) are never selected.
pub fn select_reservations<'r>(
    reservations: &'r [Reservation],
    target: Target<'_>,
) -> Vec<&'r Reservation> {
    reservations
        .iter()
        .filter(|r| match target {
            Target::Room(name) => r.room == name,
            Target::Primary => true,
        })
        .filter(|r| r.is_assigned())
        .collect()
}

/// Outcome of reconciling one calendar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Events deleted (including ones that were already gone)
    pub deleted: usize,
    /// Events created
    pub created: usize,
    /// Calls that failed with a non-quota error and were skipped
    pub failed: usize,
}

impl ReconcileReport {
    /// Adds another report's counts to this one
    pub fn absorb(&mut self, other: ReconcileReport) {
        self.deleted += other.deleted;
        self.created += other.created;
        self.failed += other.failed;
    }
}

/// Outcome of one call under the quota retry policy
enum CallOutcome<T> {
    Done(T),
    Failed(SyncError),
    Cancelled,
}

/// Deletes and recreates the events of one calendar
pub struct EventReconciler {
    provider: Arc<dyn CalendarProvider>,
    pacer: Arc<Pacer>,
    settings: EventSettings,
    cancel: CancellationToken,
}

impl EventReconciler {
    /// Creates a new reconciler
    ///
    /// # Arguments
    /// * `provider` - Calendar provider that receives the calls
    /// * `pacer` - Shared pacer all provider calls go through
    /// * `settings` - Site values stamped on every synthesized event
    /// * `cancel` - Observed while waiting out a quota backoff
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        pacer: Arc<Pacer>,
        settings: EventSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            provider,
            pacer,
            settings,
            cancel,
        }
    }

    /// Reconciles one calendar
    ///
    /// # Arguments
    /// * `calendar_id` - Calendar to reconcile
    /// * `existing` - Events currently on the calendar; `None` when they
    ///   could not be listed, which skips the delete phase
    /// * `reservations` - The full reservation snapshot of this pass
    /// * `target` - Which reservations belong on this calendar
    /// * `backoff` - Process-wide backoff state
    pub async fn reconcile(
        &self,
        calendar_id: &str,
        existing: Option<&[RemoteEvent]>,
        reservations: &[Reservation],
        target: Target<'_>,
        backoff: &mut BackoffPolicy,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        match existing {
            Some(events) if !events.is_empty() => {
                self.delete_phase(calendar_id, events, target, backoff, &mut report)
                    .await;
            }
            Some(_) => debug!(calendar = target.label(), "No existing events to delete"),
            None => info!(calendar = target.label(), "Skip deleting events"),
        }

        if self.cancel.is_cancelled() {
            return report;
        }

        let selected = select_reservations(reservations, target);
        if !selected.is_empty() {
            self.build_phase(calendar_id, &selected, target, backoff, &mut report)
                .await;
        }

        report
    }

    async fn delete_phase(
        &self,
        calendar_id: &str,
        events: &[RemoteEvent],
        target: Target<'_>,
        backoff: &mut BackoffPolicy,
        report: &mut ReconcileReport,
    ) {
        for event in events {
            let outcome = self
                .with_quota_retry(backoff, || {
                    self.provider.delete_event(calendar_id, &event.id)
                })
                .await;

            match outcome {
                CallOutcome::Done(()) => report.deleted += 1,
                CallOutcome::Failed(e) => {
                    warn!(
                        calendar = target.label(),
                        event_id = %event.id,
                        error = %e,
                        "Failed to delete event"
                    );
                    report.failed += 1;
                }
                CallOutcome::Cancelled => return,
            }
        }

        info!(
            calendar = target.label(),
            deleted = report.deleted,
            "Deleted all events"
        );
    }

    async fn build_phase(
        &self,
        calendar_id: &str,
        selected: &[&Reservation],
        target: Target<'_>,
        backoff: &mut BackoffPolicy,
        report: &mut ReconcileReport,
    ) {
        let total = selected.len();

        for reservation in selected {
            let event = synthesize_event(reservation, &self.settings);
            let outcome = self
                .with_quota_retry(backoff, || self.provider.insert_event(calendar_id, &event))
                .await;

            match outcome {
                CallOutcome::Done(event_id) => {
                    report.created += 1;
                    debug!(event_id = %event_id, summary = %event.summary, "Event created");
                    info!(
                        calendar = target.label(),
                        created = report.created,
                        total,
                        "Number of events created"
                    );
                }
                CallOutcome::Failed(e) => {
                    warn!(
                        calendar = target.label(),
                        summary = %event.summary,
                        error = %e,
                        "Failed to create event"
                    );
                    report.failed += 1;
                }
                CallOutcome::Cancelled => return,
            }
        }

        info!(
            calendar = target.label(),
            created = report.created,
            "Created all events"
        );
    }

    /// Runs a provider call through the pacer, retrying it after the backoff
    /// delay for as long as it is rejected for quota
    async fn with_quota_retry<T, F, Fut>(
        &self,
        backoff: &mut BackoffPolicy,
        mut call: F,
    ) -> CallOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        loop {
            match self.pacer.pace(call()).await {
                Ok(value) => {
                    backoff.on_success();
                    return CallOutcome::Done(value);
                }
                Err(e) if e.is_quota_exceeded() => {
                    let wait = backoff.on_quota_exceeded();
                    warn!(
                        delay_secs = wait.as_secs(),
                        error = %e,
                        "Quota exceeded, next call delayed"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = self.cancel.cancelled() => return CallOutcome::Cancelled,
                    }
                }
                Err(e) => return CallOutcome::Failed(e),
            }
        }
    }
}
