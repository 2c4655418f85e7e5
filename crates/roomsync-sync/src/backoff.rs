//! Rate-limit backoff
//!
//! The calendar provider enforces one rate limit for the whole authorized
//! client, so a single [`BackoffPolicy`] is owned by the sync loop and lent
//! (`&mut`) to every call site that can hit a quota rejection. The delay
//! persists across rooms and passes and decays as calls succeed again.
//!
//! ## Behaviour
//!
//! - Quota rejection: `current *= multiplier`, then the caller waits `current`.
//! - Success: if `current > base`, halve it, never below `base`.

use std::time::Duration;

use roomsync_core::config::PacingConfig;

/// Exponential backoff state for quota rejections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Floor of the delay
    base: Duration,
    /// Delay that will be (or was last) waited
    current: Duration,
    /// Escalation factor applied on every quota rejection
    multiplier: u32,
}

impl BackoffPolicy {
    /// Creates a policy starting at `base`
    pub fn new(base: Duration, multiplier: u32) -> Self {
        Self {
            base,
            current: base,
            multiplier,
        }
    }

    /// Creates a policy from the `pacing` configuration section
    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(config.backoff_base(), config.backoff_multiplier)
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    /// Returns true if the delay is above its floor
    pub fn is_escalated(&self) -> bool {
        self.current > self.base
    }

    /// Escalates after a quota rejection and returns how long to wait
    /// before retrying the same call
    pub fn on_quota_exceeded(&mut self) -> Duration {
        self.current = self.current.saturating_mul(self.multiplier);
        self.current
    }

    /// Decays the delay after a successful call
    pub fn on_success(&mut self) {
        if self.is_escalated() {
            self.current = (self.current / 2).max(self.base);
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&PacingConfig::default())
    }
}
