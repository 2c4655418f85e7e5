//! roomsync Sync - reservation to calendar sync engine
//!
//! Provides:
//! - Delete-then-recreate reconciliation of room calendars
//! - Sequential, paced calendar provider calls
//! - Exponential backoff on quota rejections
//! - A periodic, cancellable sync loop
//!
//! ## Modules
//!
//! - [`backoff`] - Quota backoff state shared across rooms and passes
//! - [`pacing`] - Serialized provider calls with a fixed gap
//! - [`reconciler`] - Per-calendar delete and build phases
//! - [`scheduler`] - Per-room orchestration of one pass
//! - [`engine`] - The periodic sync loop

pub mod backoff;
pub mod engine;
pub mod pacing;
pub mod reconciler;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;

pub use backoff::BackoffPolicy;
pub use engine::SyncLoop;
pub use pacing::Pacer;
pub use reconciler::{EventReconciler, ReconcileReport};
pub use scheduler::{PassReport, RoomScheduler};
