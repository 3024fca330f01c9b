//! # Control Packet Encoder
//!
//! Turns joystick readings into control packets.

use super::packet::*;
use crate::input::JoystickSample;

/// Classify the lateral stick reading into a steering command
///
/// | Reading | Command |
/// |---------|---------|
/// | `> 800` | `'P'` |
/// | `< 300` | `'S'` |
/// | `300..=800` | `'A'` |
///
/// # Examples
///
/// ```
/// use rc_link::protocol::encoder::classify_steering;
/// use rc_link::protocol::packet::SteeringCommand;
///
/// assert_eq!(classify_steering(900), SteeringCommand::Port);
/// assert_eq!(classify_steering(800), SteeringCommand::Ahead);
/// ```
#[must_use]
pub fn classify_steering(value: u16) -> SteeringCommand {
    if value > THRESHOLD_HIGH {
        SteeringCommand::Port
    } else if value < THRESHOLD_LOW {
        SteeringCommand::Starboard
    } else {
        SteeringCommand::Ahead
    }
}

/// Classify the longitudinal stick reading into a speed cap
///
/// Same thresholds as [`classify_steering`]: `'F'` above 800, `'H'` below
/// 300, `'M'` for `300..=800`.
#[must_use]
pub fn classify_speed_cap(value: u16) -> SpeedCap {
    if value > THRESHOLD_HIGH {
        SpeedCap::Full
    } else if value < THRESHOLD_LOW {
        SpeedCap::Half
    } else {
        SpeedCap::Maintain
    }
}

/// Split a throttle magnitude into four decimal digits, thousands first
///
/// `value` must be at most [`THROTTLE_MAX`]; larger values leave a
/// thousands "digit" above 9.
#[must_use]
pub fn decompose_digits(value: u16) -> Digits {
    debug_assert!(value <= THROTTLE_MAX, "throttle {} exceeds {}", value, THROTTLE_MAX);

    [
        (value / 1000) as u8,
        ((value % 1000) / 100) as u8,
        ((value % 100) / 10) as u8,
        (value % 10) as u8,
    ]
}

/// Assemble a control packet
///
/// # Arguments
///
/// * `steering` - Steering command (offset 0)
/// * `speed_cap` - Speed-cap command (offset 1)
/// * `digits` - Throttle digits (offsets 2-5)
///
/// # Returns
///
/// * `ControlPacket` - 7 bytes, terminated by the space delimiter
pub fn encode_packet(steering: SteeringCommand, speed_cap: SpeedCap, digits: Digits) -> ControlPacket {
    let mut bytes = [0u8; PACKET_LEN];
    bytes[STEERING_OFFSET] = steering.as_byte();
    bytes[SPEED_CAP_OFFSET] = speed_cap.as_byte();
    bytes[DIGITS_OFFSET..DIGITS_OFFSET + DIGIT_COUNT].copy_from_slice(&digits);
    bytes[DELIMITER_OFFSET] = PACKET_DELIMITER;

    ControlPacket::from_bytes(bytes)
}

/// Encode one joystick sample
///
/// The lateral axis selects steering, the longitudinal axis selects the
/// speed cap and the throttle axis is sent as digits.
///
/// # Examples
///
/// ```
/// use rc_link::input::JoystickSample;
/// use rc_link::protocol::encoder::encode_sample;
///
/// let packet = encode_sample(&JoystickSample::new(1234, 900, 250));
/// assert_eq!(packet.as_bytes(), &[b'P', b'H', 1, 2, 3, 4, b' ']);
/// ```
pub fn encode_sample(sample: &JoystickSample) -> ControlPacket {
    encode_packet(
        classify_steering(sample.lateral),
        classify_speed_cap(sample.longitudinal),
        decompose_digits(sample.throttle),
    )
}
