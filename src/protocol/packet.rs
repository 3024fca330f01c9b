//! # Control Packet Constants and Types
//!
//! Wire layout and symbol definitions for the RC link.
//!
//! ```text
//! offset  0         1          2..=5                  6
//!         steering  speed cap  throttle digits (d3-d0)  ' '
//! ```
//!
//! The digit bytes carry raw values 0-9, not ASCII characters.

use crate::error::{RcLinkError, Result};

/// Total packet length in bytes
pub const PACKET_LEN: usize = 7;

/// Packet delimiter (space)
pub const PACKET_DELIMITER: u8 = b' ';

/// Offset of the steering command byte
pub const STEERING_OFFSET: usize = 0;

/// Offset of the speed-cap command byte
pub const SPEED_CAP_OFFSET: usize = 1;

/// Offset of the first (thousands) throttle digit
pub const DIGITS_OFFSET: usize = 2;

/// Number of throttle digits
pub const DIGIT_COUNT: usize = 4;

/// Offset of the delimiter byte
pub const DELIMITER_OFFSET: usize = 6;

/// Readings above this select the high command (`'P'` / `'F'`)
pub const THRESHOLD_HIGH: u16 = 800;

/// Readings below this select the low command (`'S'` / `'H'`)
pub const THRESHOLD_LOW: u16 = 300;

/// Largest throttle magnitude the four digits can carry
pub const THROTTLE_MAX: u16 = 9999;

/// Throttle digits, most significant first
pub type Digits = [u8; DIGIT_COUNT];

/// Steering command carried at offset 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SteeringCommand {
    /// Lateral stick pushed high
    Port,
    /// Lateral stick pulled low
    Starboard,
    /// Lateral stick in the middle band
    Ahead,
}

impl SteeringCommand {
    /// Wire symbol for this command.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Port => b'P',
            Self::Starboard => b'S',
            Self::Ahead => b'A',
        }
    }

    /// Parses a wire symbol. Returns `None` for any byte outside `{P, S, A}`.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'P' => Some(Self::Port),
            b'S' => Some(Self::Starboard),
            b'A' => Some(Self::Ahead),
            _ => None,
        }
    }
}

/// Speed-cap command carried at offset 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedCap {
    /// Longitudinal stick pushed high
    Full,
    /// Longitudinal stick pulled low
    Half,
    /// Longitudinal stick in the middle band
    Maintain,
}

impl SpeedCap {
    /// Wire symbol for this command.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Full => b'F',
            Self::Half => b'H',
            Self::Maintain => b'M',
        }
    }

    /// Parses a wire symbol. Returns `None` for any byte outside `{F, H, M}`.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'F' => Some(Self::Full),
            b'H' => Some(Self::Half),
            b'M' => Some(Self::Maintain),
            _ => None,
        }
    }
}

/// One 7-byte control packet
///
/// Holds raw bytes so that anything received off the wire, including
/// unrecognized symbols and out-of-range digits, can be represented and
/// handed to the decoder unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlPacket([u8; PACKET_LEN]);

impl ControlPacket {
    /// Wraps raw packet bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; PACKET_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds a packet from a received slice
    ///
    /// # Errors
    ///
    /// Returns `RcLinkError::Protocol` if the slice is not exactly
    /// [`PACKET_LEN`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; PACKET_LEN] = bytes.try_into().map_err(|_| {
            RcLinkError::Protocol(format!(
                "Packet length {} does not match expected {}",
                bytes.len(),
                PACKET_LEN
            ))
        })?;
        Ok(Self(array))
    }

    /// Raw packet bytes in wire order.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }

    #[must_use]
    pub const fn steering_byte(&self) -> u8 {
        self.0[STEERING_OFFSET]
    }

    #[must_use]
    pub const fn speed_cap_byte(&self) -> u8 {
        self.0[SPEED_CAP_OFFSET]
    }

    /// Throttle digits, thousands first.
    #[must_use]
    pub fn digits(&self) -> Digits {
        let mut digits = [0u8; DIGIT_COUNT];
        digits.copy_from_slice(&self.0[DIGITS_OFFSET..DIGITS_OFFSET + DIGIT_COUNT]);
        digits
    }

    #[must_use]
    pub const fn delimiter(&self) -> u8 {
        self.0[DELIMITER_OFFSET]
    }

    /// Whether the trailing byte is the expected space.
    ///
    /// The decoder does not act on this; the framing is purely positional.
    #[must_use]
    pub const fn has_valid_delimiter(&self) -> bool {
        self.delimiter() == PACKET_DELIMITER
    }
}

impl From<[u8; PACKET_LEN]> for ControlPacket {
    fn from(bytes: [u8; PACKET_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for ControlPacket {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(PACKET_LEN, 7);
        assert_eq!(PACKET_DELIMITER, 0x20);
        assert_eq!(DIGITS_OFFSET + DIGIT_COUNT, DELIMITER_OFFSET);
        assert_eq!(DELIMITER_OFFSET + 1, PACKET_LEN);
    }

    #[test]
    fn test_steering_symbols() {
        for cmd in [SteeringCommand::Port, SteeringCommand::Starboard, SteeringCommand::Ahead] {
            assert_eq!(SteeringCommand::from_byte(cmd.as_byte()), Some(cmd));
        }
        assert_eq!(SteeringCommand::Port.as_byte(), b'P');
        assert_eq!(SteeringCommand::from_byte(b'p'), None);
        assert_eq!(SteeringCommand::from_byte(b'F'), None);
    }

    #[test]
    fn test_speed_cap_symbols() {
        for cap in [SpeedCap::Full, SpeedCap::Half, SpeedCap::Maintain] {
            assert_eq!(SpeedCap::from_byte(cap.as_byte()), Some(cap));
        }
        assert_eq!(SpeedCap::Half.as_byte(), b'H');
        assert_eq!(SpeedCap::from_byte(b'A'), None);
        assert_eq!(SpeedCap::from_byte(0), None);
    }

    #[test]
    fn test_packet_accessors() {
        let packet = ControlPacket::from_bytes([b'P', b'H', 1, 2, 3, 4, b' ']);
        assert_eq!(packet.steering_byte(), b'P');
        assert_eq!(packet.speed_cap_byte(), b'H');
        assert_eq!(packet.digits(), [1, 2, 3, 4]);
        assert!(packet.has_valid_delimiter());
    }

    #[test]
    fn test_from_slice_exact_length() {
        let packet = ControlPacket::from_slice(&[b'A', b'M', 0, 0, 0, 0, b' ']).unwrap();
        assert_eq!(packet.as_bytes(), &[b'A', b'M', 0, 0, 0, 0, b' ']);
    }

    #[test]
    fn test_from_slice_wrong_length() {
        assert!(ControlPacket::from_slice(&[b'A', b'M', 0, 0, 0, 0]).is_err());
        assert!(ControlPacket::from_slice(&[0u8; 8]).is_err());
        assert!(ControlPacket::from_slice(&[]).is_err());
    }

    #[test]
    fn test_bad_delimiter_detected() {
        let packet = ControlPacket::from_bytes([b'A', b'M', 0, 0, 0, 0, b'\n']);
        assert!(!packet.has_valid_delimiter());
    }
}
