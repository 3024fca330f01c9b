//! # RC Transmitter
//!
//! Reads joystick samples from stdin and streams control packets over the
//! serial link.
//!
//! # Usage
//!
//! ```bash
//! rc-transmitter [config.toml] < samples.txt
//! ```
//!
//! Each input line holds `throttle lateral longitudinal`, for example
//! `1234 900 250`.

use anyhow::{Context, Result};
use tracing::info;

use rc_link::config::Config;
use rc_link::input::LineSource;
use rc_link::node::Transmitter;
use rc_link::serial::LinkSerial;

/// Config file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = rc_link::logging::init(&config.logging)?;
    info!("RC Transmitter v{} starting...", env!("CARGO_PKG_VERSION"));

    let serial = LinkSerial::open_config(&config.serial)?;
    info!("Serial port opened at: {}", serial.device_path());

    let mut transmitter = Transmitter::new(LineSource::stdin(), serial)
        .with_loop_interval(config.transmitter.loop_interval())
        .with_log_interval(config.transmitter.log_interval_packets);

    info!("Reading samples from stdin, press Ctrl+C to exit");
    transmitter.run().await?;

    Ok(())
}
