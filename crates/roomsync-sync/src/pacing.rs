//! Call pacing for the calendar provider
//!
//! Every calendar provider call goes through one [`Pacer`]. It allows a
//! single call in flight and keeps the slot held for a fixed delay after the
//! call returns, success or failure, so two calls are always at least
//! `delay` apart.

use std::{future::Future, time::Duration};

use roomsync_core::config::PacingConfig;
use tokio::sync::Mutex;

/// Serializes provider calls with a fixed gap between them
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    slot: Mutex<()>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slot: Mutex::new(()),
        }
    }

    /// Creates a pacer using `pacing.call_delay_ms`
    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(config.call_delay())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `call` once the slot is free, then holds the slot for the
    /// pacing delay before returning its output
    ///
    /// `call` is not polled until the slot is acquired.
    pub async fn pace<F: Future>(&self, call: F) -> F::Output {
        let _slot = self.slot.lock().await;
        let output = call.await;
        tokio::time::sleep(self.delay).await;
        output
    }
}
