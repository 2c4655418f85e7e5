//! Configuration module for roomsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::EventSettings;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for roomsync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub booking: BookingConfig,
    pub calendar: CalendarConfig,
    pub pacing: PacingConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Booking source (reservation feed) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// API root; `/registrations` is appended.
    pub base_url: String,
    /// Name of the environment variable holding the API token.
    pub token_env: String,
    /// Page size sent as `limit`; 0 asks for every matching registration.
    pub limit: u32,
    /// Days before today included in the fetch window.
    pub past_days: u32,
    /// Months after today included in the fetch window.
    pub future_months: u32,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

/// Calendar provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Calendar API root.
    pub base_url: String,
    /// JSON file holding a pre-authorized OAuth access token.
    pub token_file: PathBuf,
    /// Venue address written into every event.
    pub location: String,
    /// IANA time zone of the venue.
    pub time_zone: String,
    /// Maximum calendars read from the directory per pass.
    pub calendar_page_size: u32,
    /// Maximum existing events read per calendar.
    pub event_page_size: u32,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

/// Provider call pacing and rate-limit backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Milliseconds to wait after every calendar provider call.
    pub call_delay_ms: u64,
    /// Milliseconds to wait before moving on to the next room.
    pub room_delay_ms: u64,
    /// Backoff floor in minutes. The backoff never drops below this.
    pub backoff_base_minutes: u64,
    /// Factor applied to the backoff on every quota rejection.
    pub backoff_multiplier: u32,
}

/// Which calendars reservations are written to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// One calendar per room, holding that room's reservations.
    #[default]
    Rooms,
    /// Every assigned reservation on the account's primary calendar.
    Primary,
}

/// Sync loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Minutes between the end of one pass and the start of the next.
    pub interval_minutes: u64,
    pub mode: SyncMode,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/roomsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("roomsync")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sunmountaincenter.secure.retreat.guru/api/v1".to_string(),
            token_env: "RETREAT_GURU_TOKEN".to_string(),
            limit: 0,
            past_days: 3,
            future_months: 6,
            timeout_secs: 60,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            token_file: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join(".credentials")
                .join("roomsync-calendar.json"),
            location: "328 El Paso Blvd".to_string(),
            time_zone: "America/Denver".to_string(),
            calendar_page_size: 50,
            event_page_size: 200,
            timeout_secs: 60,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            call_delay_ms: 333,
            room_delay_ms: 333,
            backoff_base_minutes: 2,
            backoff_multiplier: 2,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 30,
            mode: SyncMode::Rooms,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

impl BookingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CalendarConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Site values stamped on every synthesized event
    pub fn event_settings(&self) -> EventSettings {
        EventSettings {
            location: self.location.clone(),
            time_zone: self.time_zone.clone(),
        }
    }
}

impl PacingConfig {
    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.call_delay_ms)
    }

    pub fn room_delay(&self) -> Duration {
        Duration::from_millis(self.room_delay_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs(self.backoff_base_minutes * 60)
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.interval_minutes"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Largest page the calendar list endpoint accepts.
const MAX_CALENDAR_PAGE_SIZE: u32 = 250;

/// Largest page the events endpoint accepts.
const MAX_EVENT_PAGE_SIZE: u32 = 2500;

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ValidationError {
                field: field.into(),
                message,
            })
        };

        // --- booking ---
        if !is_http_url(&self.booking.base_url) {
            push(
                "booking.base_url",
                format!("must be an http(s) URL: {}", self.booking.base_url),
            );
        }
        if self.booking.token_env.trim().is_empty() {
            push("booking.token_env", "must not be empty".into());
        }
        if self.booking.timeout_secs == 0 {
            push("booking.timeout_secs", "must be greater than 0".into());
        }

        // --- calendar ---
        if !is_http_url(&self.calendar.base_url) {
            push(
                "calendar.base_url",
                format!("must be an http(s) URL: {}", self.calendar.base_url),
            );
        }
        if self.calendar.time_zone.trim().is_empty() {
            push("calendar.time_zone", "must not be empty".into());
        }
        if self.calendar.calendar_page_size == 0
            || self.calendar.calendar_page_size > MAX_CALENDAR_PAGE_SIZE
        {
            push(
                "calendar.calendar_page_size",
                format!("must be in range 1..={MAX_CALENDAR_PAGE_SIZE}"),
            );
        }
        if self.calendar.event_page_size == 0
            || self.calendar.event_page_size > MAX_EVENT_PAGE_SIZE
        {
            push(
                "calendar.event_page_size",
                format!("must be in range 1..={MAX_EVENT_PAGE_SIZE}"),
            );
        }
        if self.calendar.timeout_secs == 0 {
            push("calendar.timeout_secs", "must be greater than 0".into());
        }

        // --- pacing ---
        if self.pacing.backoff_base_minutes == 0 {
            push("pacing.backoff_base_minutes", "must be greater than 0".into());
        }
        if self.pacing.backoff_multiplier < 2 {
            push("pacing.backoff_multiplier", "must be at least 2".into());
        }

        // --- sync ---
        if self.sync.interval_minutes == 0 {
            push("sync.interval_minutes", "must be greater than 0".into());
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            push(
                "logging.level",
                format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            );
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use roomsync_core::config::{ConfigBuilder, SyncMode};
///
/// let config = ConfigBuilder::new()
///     .sync_interval_minutes(15)
///     .sync_mode(SyncMode::Primary)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- booking ---

    pub fn booking_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.booking.base_url = url.into();
        self
    }

    pub fn booking_token_env(mut self, name: impl Into<String>) -> Self {
        self.config.booking.token_env = name.into();
        self
    }

    // --- calendar ---

    pub fn calendar_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.calendar.base_url = url.into();
        self
    }

    pub fn calendar_token_file(mut self, path: PathBuf) -> Self {
        self.config.calendar.token_file = path;
        self
    }

    pub fn calendar_location(mut self, location: impl Into<String>) -> Self {
        self.config.calendar.location = location.into();
        self
    }

    pub fn calendar_time_zone(mut self, tz: impl Into<String>) -> Self {
        self.config.calendar.time_zone = tz.into();
        self
    }

    // --- pacing ---

    pub fn pacing_call_delay_ms(mut self, ms: u64) -> Self {
        self.config.pacing.call_delay_ms = ms;
        self
    }

    pub fn pacing_room_delay_ms(mut self, ms: u64) -> Self {
        self.config.pacing.room_delay_ms = ms;
        self
    }

    pub fn pacing_backoff_base_minutes(mut self, minutes: u64) -> Self {
        self.config.pacing.backoff_base_minutes = minutes;
        self
    }

    pub fn pacing_backoff_multiplier(mut self, factor: u32) -> Self {
        self.config.pacing.backoff_multiplier = factor;
        self
    }

    // --- sync ---

    pub fn sync_interval_minutes(mut self, minutes: u64) -> Self {
        self.config.sync.interval_minutes = minutes;
        self
    }

    pub fn sync_mode(mut self, mode: SyncMode) -> Self {
        self.config.sync.mode = mode;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
