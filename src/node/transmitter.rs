//! Transmitter control loop

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::Result;
use crate::input::SampleSource;
use crate::protocol::encoder::encode_sample;
use crate::protocol::packet::ControlPacket;
use crate::serial::port_trait::SerialPortIO;
use crate::serial::LinkSerial;

/// Default number of packets between status log messages
pub const DEFAULT_LOG_INTERVAL_PACKETS: u64 = 1000;

/// Samples the joysticks and streams control packets
pub struct Transmitter<S, P> {
    source: S,
    serial: LinkSerial<P>,
    loop_interval: Option<Duration>,
    log_interval_packets: u64,
    packets_sent: u64,
}

impl<S, P> Transmitter<S, P>
where
    S: SampleSource,
    P: SerialPortIO,
{
    /// Free-running transmitter
    pub fn new(source: S, serial: LinkSerial<P>) -> Self {
        Self {
            source,
            serial,
            loop_interval: None,
            log_interval_packets: DEFAULT_LOG_INTERVAL_PACKETS,
            packets_sent: 0,
        }
    }

    /// Send at most one packet per `interval`; `None` is free-running.
    #[must_use]
    pub fn with_loop_interval(mut self, interval: Option<Duration>) -> Self {
        self.loop_interval = interval;
        self
    }

    #[must_use]
    pub fn with_log_interval(mut self, packets: u64) -> Self {
        self.log_interval_packets = packets.max(1);
        self
    }

    /// Run one iteration: sample, encode, send
    ///
    /// # Returns
    ///
    /// * `Ok(Some(packet))` - The packet that went out
    /// * `Ok(None)` - The sample source is exhausted
    ///
    /// # Errors
    ///
    /// Returns sensor or serial errors from the collaborators
    pub async fn step(&mut self) -> Result<Option<ControlPacket>> {
        let Some(sample) = self.source.next_sample().await? else {
            return Ok(None);
        };

        let packet = encode_sample(&sample);
        self.serial.send_packet(&packet).await?;
        self.packets_sent += 1;

        if self.packets_sent % self.log_interval_packets == 0 {
            info!("Sent {} packets (last {:?})", self.packets_sent, packet.as_bytes());
        }

        Ok(Some(packet))
    }

    /// Loop until the source is exhausted or `shutdown` completes
    ///
    /// Shutdown is checked before every tick and every send, so a completed
    /// `shutdown` stops the loop before the next packet goes out.
    ///
    /// # Returns
    ///
    /// * `Result<u64>` - Total packets sent
    pub async fn run_until<F: Future>(&mut self, shutdown: F) -> Result<u64> {
        tokio::pin!(shutdown);

        let mut ticker = self.loop_interval.map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        info!(
            "Starting transmit loop ({})",
            match self.loop_interval {
                Some(period) => format!("every {:?}", period),
                None => "free-running".to_string(),
            }
        );

        loop {
            if let Some(ticker) = ticker.as_mut() {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        info!("Shutdown requested");
                        break;
                    }
                    _ = ticker.tick() => {}
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                result = self.step() => {
                    if result?.is_none() {
                        info!("Sample source exhausted");
                        break;
                    }
                }
            }
        }

        info!("Total packets sent: {}", self.packets_sent);
        Ok(self.packets_sent)
    }

    /// Loop until the source is exhausted or Ctrl+C
    pub async fn run(&mut self) -> Result<u64> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                debug!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Packets sent so far
    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    /// Serial link in use
    pub fn serial(&self) -> &LinkSerial<P> {
        &self.serial
    }
}
