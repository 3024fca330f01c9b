//! # Telemetry Module
//!
//! Records what the receiver did with each packet.
//!
//! This module handles:
//! - Formatting actuation records as JSONL (JSON Lines)
//! - Writing to rotating log files
//! - Retaining only the last N files

pub mod logger;

pub use logger::{TelemetryLogger, TelemetryRecord};
