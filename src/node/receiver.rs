//! Receiver control loop

use std::future::Future;

use tracing::{debug, info, warn};

use crate::actuator::ActuatorSink;
use crate::error::{RcLinkError, Result};
use crate::protocol::decoder::{decode_and_actuate, reconstruct_throttle, ActuationState};
use crate::protocol::packet::{ControlPacket, SpeedCap, SteeringCommand};
use crate::serial::port_trait::SerialPortIO;
use crate::serial::LinkSerial;
use crate::telemetry::{TelemetryLogger, TelemetryRecord};

/// Default number of packets between status log messages
pub const DEFAULT_LOG_INTERVAL_PACKETS: u64 = 1000;

/// Receives control packets and drives the actuators
///
/// Owns the [`ActuationState`] and threads it through every decode.
pub struct Receiver<P, A> {
    serial: LinkSerial<P>,
    sink: A,
    state: ActuationState,
    telemetry: Option<TelemetryLogger>,
    log_interval_packets: u64,
    packets_received: u64,
    unrecognized_symbols: u64,
}

impl<P, A> Receiver<P, A>
where
    P: SerialPortIO,
    A: ActuatorSink,
{
    /// Receiver starting from an all-zero actuation state
    pub fn new(serial: LinkSerial<P>, sink: A) -> Self {
        Self {
            serial,
            sink,
            state: ActuationState::default(),
            telemetry: None,
            log_interval_packets: DEFAULT_LOG_INTERVAL_PACKETS,
            packets_received: 0,
            unrecognized_symbols: 0,
        }
    }

    #[must_use]
    pub fn with_initial_state(mut self, state: ActuationState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Option<TelemetryLogger>) -> Self {
        self.telemetry = telemetry;
        self
    }

    #[must_use]
    pub fn with_log_interval(mut self, packets: u64) -> Self {
        self.log_interval_packets = packets.max(1);
        self
    }

    /// Run one iteration: receive, decode, actuate
    ///
    /// # Returns
    ///
    /// * `Result<ActuationState>` - The state now applied to the outputs
    ///
    /// # Errors
    ///
    /// Returns serial errors (including `Timeout` and `ChannelClosed`) and
    /// actuator errors. A failing telemetry write is only logged.
    pub async fn step(&mut self) -> Result<ActuationState> {
        let packet = self.serial.receive_packet().await?;
        self.handle_packet(&packet)
    }

    /// Decode and apply a packet that has already been received
    pub fn handle_packet(&mut self, packet: &ControlPacket) -> Result<ActuationState> {
        if SteeringCommand::from_byte(packet.steering_byte()).is_none() {
            debug!("Unrecognized steering byte 0x{:02X}, keeping drive duty", packet.steering_byte());
            self.unrecognized_symbols += 1;
        }
        if SpeedCap::from_byte(packet.speed_cap_byte()).is_none() {
            debug!("Unrecognized speed-cap byte 0x{:02X}, keeping scale", packet.speed_cap_byte());
            self.unrecognized_symbols += 1;
        }

        let next = decode_and_actuate(packet, &self.state);
        self.sink.apply(&next)?;
        self.state = next;
        self.packets_received += 1;

        if let Some(telemetry) = self.telemetry.as_mut() {
            let [d3, d2, d1, d0] = packet.digits();
            let record = TelemetryRecord::new(packet, reconstruct_throttle(d3, d2, d1, d0), &next);
            if let Err(e) = telemetry.record(&record) {
                warn!("Failed to write telemetry: {}", e);
            }
        }

        if self.packets_received % self.log_interval_packets == 0 {
            info!(
                "Received {} packets (drive duty {}, steering PWM {})",
                self.packets_received, next.drive_duty, next.steering_pwm
            );
            if self.unrecognized_symbols > 0 {
                warn!("{} unrecognized command symbols so far", self.unrecognized_symbols);
            }
        }

        Ok(next)
    }

    /// Loop until the link closes or `shutdown` completes
    ///
    /// # Returns
    ///
    /// * `Result<u64>` - Total packets received
    ///
    /// # Errors
    ///
    /// Returns the first error other than a closed channel
    pub async fn run_until<F: Future>(&mut self, shutdown: F) -> Result<u64> {
        tokio::pin!(shutdown);
        info!("Starting receive loop on {}", self.serial.device_path());

        let outcome = loop {
            tokio::select! {
                result = self.step() => match result {
                    Ok(_) => {}
                    Err(RcLinkError::ChannelClosed) => {
                        info!("Serial channel closed");
                        break Ok(());
                    }
                    Err(e) => break Err(e),
                },
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break Ok(());
                }
            }
        };

        if let Some(telemetry) = self.telemetry.as_mut() {
            if let Err(e) = telemetry.flush() {
                warn!("Failed to flush telemetry: {}", e);
            }
        }

        info!("Total packets received: {}", self.packets_received);
        outcome.map(|()| self.packets_received)
    }

    /// Loop until the link closes or Ctrl+C
    pub async fn run(&mut self) -> Result<u64> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                debug!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Current actuation state
    pub fn state(&self) -> &ActuationState {
        &self.state
    }

    /// Packets received so far
    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    /// Steering and speed-cap bytes that matched no command so far
    pub fn unrecognized_symbols(&self) -> u64 {
        self.unrecognized_symbols
    }

    /// Actuator sink in use
    pub fn sink(&self) -> &A {
        &self.sink
    }
}
