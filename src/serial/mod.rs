//! # Serial Communication Module
//!
//! Handles the byte stream between the transmitter and receiver nodes.
//!
//! This module handles:
//! - Opening the UART (8N1, default 9600 baud)
//! - Sending control packets one byte at a time
//! - Receiving fixed-length control packets
//! - Optional timeouts so a lost link does not hang a node forever

pub mod port_trait;

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::config::SerialConfig;
use crate::error::{RcLinkError, Result};
use crate::protocol::packet::{ControlPacket, PACKET_LEN};
use port_trait::{SerialPortIO, StreamPort, TokioSerialPort};

/// Default UART baud rate of the link
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default device paths to try (in order of preference)
pub const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters
    "/dev/ttyACM0", // USB CDC devices
];

/// Serial link handler
///
/// Owns a [`SerialPortIO`] and the timeout policy applied to every packet.
pub struct LinkSerial<P> {
    /// Underlying port
    port: P,
    /// Device path (e.g., /dev/ttyUSB0), or a label for in-memory ports
    device_path: String,
    /// `None` blocks until the channel is ready
    timeout: Option<Duration>,
}

impl<P> std::fmt::Debug for LinkSerial<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkSerial")
            .field("device_path", &self.device_path)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LinkSerial<TokioSerialPort> {
    /// Open a serial device at the given baud rate
    ///
    /// # Errors
    ///
    /// Returns `RcLinkError::Serial` if the device cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rc_link::serial::LinkSerial;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let serial = LinkSerial::open("/dev/ttyUSB0", 9600)?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let stream = Self::open_port(path, baud_rate)?;
        info!("Opened serial device at {} ({} baud)", path, baud_rate);
        Ok(Self::new(StreamPort::new(stream), path))
    }

    /// Open the port described by the `[serial]` config section
    ///
    /// `port = "auto"` tries [`DEFAULT_DEVICE_PATHS`] in order; any other
    /// value is opened as a device path. The configured timeout is applied.
    ///
    /// # Errors
    ///
    /// - `RcLinkError::Serial` if an explicit path cannot be opened
    /// - `RcLinkError::SerialPortNotFound` if no default device responds
    pub fn open_config(config: &SerialConfig) -> Result<Self> {
        let serial = if config.auto_detect() {
            info!("Auto-detecting serial device");
            Self::open_with_paths(DEFAULT_DEVICE_PATHS, config.baud_rate)?
        } else {
            Self::open(&config.port, config.baud_rate)?
        };
        Ok(serial.with_timeout(config.timeout()))
    }

    /// Open the first device that succeeds
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyUSB0"])
    /// * `baud_rate` - UART baud rate
    ///
    /// # Errors
    ///
    /// Returns `RcLinkError::SerialPortNotFound` listing every path tried
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open(path, baud_rate) {
                Ok(serial) => return Ok(serial),
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(RcLinkError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with 8N1 settings
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| RcLinkError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }
}

impl<P: SerialPortIO> LinkSerial<P> {
    /// Wrap an already open port. No timeout is applied.
    pub fn new(port: P, device_path: impl Into<String>) -> Self {
        Self {
            port,
            device_path: device_path.into(),
            timeout: None,
        }
    }

    /// Bound every packet send/receive by `timeout`; `None` blocks forever.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured packet timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Send a control packet
    ///
    /// Bytes go out one at a time and each is flushed before the next, so a
    /// slow channel applies backpressure byte by byte.
    ///
    /// # Errors
    ///
    /// - `RcLinkError::Serial` if a write or flush fails
    /// - `RcLinkError::Timeout` if the packet is not out within the timeout
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rc_link::input::JoystickSample;
    /// use rc_link::protocol::encoder::encode_sample;
    /// use rc_link::serial::LinkSerial;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let mut serial = LinkSerial::open("/dev/ttyUSB0", 9600)?;
    ///     let packet = encode_sample(&JoystickSample::new(512, 512, 512));
    ///     serial.send_packet(&packet).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn send_packet(&mut self, packet: &ControlPacket) -> Result<()> {
        let port = &mut self.port;
        bounded(self.timeout, async move {
            for &byte in packet.as_bytes() {
                port.write_byte(byte)
                    .await
                    .map_err(|e| RcLinkError::Serial(format!("Failed to write byte: {}", e)))?;
                port.flush()
                    .await
                    .map_err(|e| RcLinkError::Serial(format!("Failed to flush serial port: {}", e)))?;
            }
            Ok::<(), RcLinkError>(())
        })
        .await?;

        debug!("Sent control packet {:?}", packet.as_bytes());
        Ok(())
    }

    /// Receive the next control packet
    ///
    /// Reads exactly [`PACKET_LEN`] bytes. Framing is positional; a wrong
    /// delimiter is logged but the packet is still returned.
    ///
    /// # Errors
    ///
    /// - `RcLinkError::ChannelClosed` if the stream ends
    /// - `RcLinkError::Serial` on other read failures
    /// - `RcLinkError::Timeout` if the packet does not arrive in time
    pub async fn receive_packet(&mut self) -> Result<ControlPacket> {
        let port = &mut self.port;
        let bytes = bounded(self.timeout, async move {
            let mut bytes = [0u8; PACKET_LEN];
            for slot in bytes.iter_mut() {
                *slot = port.read_byte().await.map_err(|e| match e.kind() {
                    io::ErrorKind::UnexpectedEof => RcLinkError::ChannelClosed,
                    _ => RcLinkError::Serial(format!("Failed to read byte: {}", e)),
                })?;
            }
            Ok::<_, RcLinkError>(bytes)
        })
        .await?;

        let packet = ControlPacket::from_bytes(bytes);
        if !packet.has_valid_delimiter() {
            warn!("Unexpected delimiter byte 0x{:02X}, stream may be misaligned", packet.delimiter());
        }

        debug!("Received control packet {:?}", packet.as_bytes());
        Ok(packet)
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

/// Runs `fut`, failing with `RcLinkError::Timeout` if `limit` elapses first
async fn bounded<T, F>(limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| RcLinkError::Timeout(limit))?,
        None => fut.await,
    }
}
