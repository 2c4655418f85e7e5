//! roomsync Core - Domain logic and port definitions
//!
//! This crate contains everything the synchronization engine needs that does
//! not perform I/O:
//! - **Domain entities** - `Reservation`, `CalendarRecord`, `RemoteEvent`, `CalendarEvent`
//! - **Event synthesis** - deterministic mapping from a reservation to a calendar event
//! - **Port definitions** - Traits for adapters: `BookingSource`, `CalendarProvider`
//! - **Configuration** - YAML configuration with defaults and validation
//!
//! # Architecture
//!
//! Adapter crates (`roomsync-booking`, `roomsync-google`) implement the ports;
//! `roomsync-sync` drives them.

pub mod config;
pub mod domain;
pub mod ports;
