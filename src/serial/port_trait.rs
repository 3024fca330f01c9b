//! Trait abstraction for byte-level serial I/O to enable testing

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Trait for serial port I/O operations
///
/// Both calls suspend until the channel is ready, the way a UART waits for
/// its data register. Timeouts are applied by the caller.
#[async_trait]
pub trait SerialPortIO: Send {
    /// Write a single byte to the port
    async fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Read a single byte from the port
    ///
    /// Returns `UnexpectedEof` once the other end has gone away.
    async fn read_byte(&mut self) -> io::Result<u8>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;
}

/// Wrapper around any tokio byte stream that implements SerialPortIO
///
/// Used with `tokio_serial::SerialStream` for real hardware and with
/// `tokio::io::DuplexStream` for in-memory links.
pub struct StreamPort<S> {
    stream: S,
}

impl<S> StreamPort<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S> SerialPortIO for StreamPort<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.stream.write_u8(byte).await
    }

    async fn read_byte(&mut self) -> io::Result<u8> {
        self.stream.read_u8().await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.stream.flush().await
    }
}

/// Serial port backed by a real UART device
pub type TokioSerialPort = StreamPort<tokio_serial::SerialStream>;

/// Creates a connected pair of in-memory ports
///
/// Bytes written to one end are read from the other, in order. `capacity`
/// bounds the bytes in flight, so writers wait once it is full.
pub fn memory_pair(capacity: usize) -> (StreamPort<tokio::io::DuplexStream>, StreamPort<tokio::io::DuplexStream>) {
    let (a, b) = tokio::io::duplex(capacity);
    (StreamPort::new(a), StreamPort::new(b))
}
