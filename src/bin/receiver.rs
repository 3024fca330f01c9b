//! # RC Receiver
//!
//! Receives control packets from the serial link and reports the resulting
//! PWM compare values.
//!
//! # Usage
//!
//! ```bash
//! rc-receiver [config.toml]
//! ```

use anyhow::{Context, Result};
use tracing::info;

use rc_link::actuator::LogActuator;
use rc_link::config::Config;
use rc_link::node::Receiver;
use rc_link::serial::LinkSerial;
use rc_link::telemetry::TelemetryLogger;

/// Config file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = rc_link::logging::init(&config.logging)?;
    info!("RC Receiver v{} starting...", env!("CARGO_PKG_VERSION"));

    let serial = LinkSerial::open_config(&config.serial)?;
    info!("Serial port opened at: {}", serial.device_path());

    let telemetry = TelemetryLogger::from_config(&config.telemetry)?;

    let mut receiver = Receiver::new(serial, LogActuator::new())
        .with_telemetry(telemetry)
        .with_log_interval(config.receiver.log_interval_packets);

    info!("Press Ctrl+C to exit");
    receiver.run().await?;

    Ok(())
}
