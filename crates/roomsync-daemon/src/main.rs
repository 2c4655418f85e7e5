//! roomsync Daemon - room reservation to calendar sync service
//!
//! This binary runs as a long-lived service (or a one-shot job with
//! `--once`) and handles:
//! - Fetching reservations from the booking system
//! - Mirroring them into one Google calendar per room
//! - Re-running the sync every `sync.interval_minutes`
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! The daemon builds the booking and calendar adapters from the YAML
//! configuration, then hands them to the [`SyncLoop`]. The loop is
//! controlled by a `CancellationToken` that is triggered on receipt of
//! SIGTERM or SIGINT.

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use roomsync_booking::client::BookingClient;
use roomsync_core::config::Config;
use roomsync_google::provider::GoogleCalendarProvider;
use roomsync_sync::SyncLoop;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "roomsyncd",
    version,
    about = "Mirror room reservations into Google Calendar"
)]
struct Args {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/roomsync/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single sync pass and exit
    #[arg(long)]
    once: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Log filter directive: `-v` flags win over the configured level
fn filter_directive(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Loads the configuration file named on the command line, or the default
/// one if present
fn load_config(path: Option<&PathBuf>) -> Result<(Config, PathBuf)> {
    match path {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            Ok((config, path.clone()))
        }
        None => {
            let path = Config::default_path();
            Ok((Config::load_or_default(&path), path))
        }
    }
}

// ============================================================================
// DaemonService
// ============================================================================

/// Main daemon service that wires the adapters into the sync loop
struct DaemonService {
    /// Application configuration loaded from YAML
    config: Config,
    /// Token for signalling graceful shutdown
    shutdown: CancellationToken,
}

impl DaemonService {
    /// Creates a new DaemonService, rejecting invalid configuration
    fn new(config: Config, shutdown: CancellationToken) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            for e in &errors {
                error!(field = %e.field, "Invalid configuration: {}", e.message);
            }
            bail!("Configuration has {} error(s)", errors.len());
        }
        Ok(Self { config, shutdown })
    }

    /// Builds the sync loop from the configured adapters
    fn build_loop(&self) -> Result<SyncLoop> {
        let booking = BookingClient::from_config(&self.config.booking)
            .context("Failed to set up booking client")?;
        let calendar = GoogleCalendarProvider::from_config(&self.config.calendar)
            .context("Failed to set up calendar client")?;

        Ok(SyncLoop::new(
            Arc::new(booking),
            Arc::new(calendar),
            &self.config,
            self.shutdown.clone(),
        ))
    }

    /// Runs a single pass, or the periodic loop until shutdown
    async fn run(&self, once: bool) -> Result<()> {
        let mut sync_loop = self.build_loop()?;

        if once {
            let report = sync_loop.run_once().await.context("Sync pass failed")?;
            info!(
                rooms_synced = report.rooms_synced,
                created = report.events.created,
                "Single pass complete"
            );
            return Ok(());
        }

        info!(
            interval_minutes = self.config.sync.interval_minutes,
            mode = ?self.config.sync.mode,
            "Starting sync loop"
        );
        sync_loop.run().await;
        Ok(())
    }
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let loaded = load_config(args.config.as_ref());

    // Initialize tracing
    let configured_level = loaded
        .as_ref()
        .map(|(config, _)| config.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(args.verbose, &configured_level)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    let (config, config_path) = loaded?;
    info!(config_path = %config_path.display(), "roomsync daemon starting (roomsyncd)");

    let shutdown_token = CancellationToken::new();

    // Spawn signal handler task
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let service = DaemonService::new(config, shutdown_token)?;
    let result = service.run(args.once).await;

    match &result {
        Ok(()) => info!("roomsync daemon shut down gracefully"),
        Err(e) => error!(error = %e, "roomsync daemon exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
