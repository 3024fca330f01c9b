//! # Control Packet Decoder
//!
//! Maps received control packets onto PWM compare values.
//!
//! Decoding never fails. Unrecognized command bytes keep the previous
//! actuation value and digit bytes are combined without range checks, so a
//! noisy byte degrades the output instead of stopping the loop.

use serde::Serialize;

use super::packet::*;

/// Drive compare value for `'A'` (7.5% duty)
pub const DRIVE_DUTY_AHEAD: u16 = 2160;

/// Drive compare value for `'P'` (5% duty)
pub const DRIVE_DUTY_PORT: u16 = 1000;

/// Drive compare value for `'S'` (10% duty)
pub const DRIVE_DUTY_STARBOARD: u16 = 5320;

/// Steering scale for `'M'`
pub const SCALE_MAINTAIN: f64 = 1.7;

/// Steering scale for `'F'`
pub const SCALE_FULL: f64 = 1.9;

/// Steering scale for `'H'`
pub const SCALE_HALF: f64 = 1.4;

/// Actuator targets owned by the receiver
///
/// Carried from one iteration to the next so that fields can be retained
/// when an unrecognized symbol arrives.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ActuationState {
    /// Drive channel compare value
    pub drive_duty: u16,

    /// Scale applied to the throttle on the steering channel
    pub scale: f64,

    /// Steering channel compare value
    pub steering_pwm: u32,
}

impl ActuationState {
    /// Creates a state with the given duty and scale and no steering output yet.
    #[must_use]
    pub fn new(drive_duty: u16, scale: f64) -> Self {
        Self {
            drive_duty,
            scale,
            steering_pwm: 0,
        }
    }
}

/// Drive compare value for a steering symbol, `None` if unrecognized
#[must_use]
pub fn select_drive_duty(byte: u8) -> Option<u16> {
    SteeringCommand::from_byte(byte).map(|command| match command {
        SteeringCommand::Ahead => DRIVE_DUTY_AHEAD,
        SteeringCommand::Port => DRIVE_DUTY_PORT,
        SteeringCommand::Starboard => DRIVE_DUTY_STARBOARD,
    })
}

/// Steering scale for a speed-cap symbol, `None` if unrecognized
#[must_use]
pub fn select_steering_scale(byte: u8) -> Option<f64> {
    SpeedCap::from_byte(byte).map(|cap| match cap {
        SpeedCap::Maintain => SCALE_MAINTAIN,
        SpeedCap::Full => SCALE_FULL,
        SpeedCap::Half => SCALE_HALF,
    })
}

/// Rebuild the throttle magnitude from its digits, thousands first
///
/// Digits are not checked against 0-9: a corrupted byte simply contributes
/// its raw value, which can push the result past 9999.
///
/// # Examples
///
/// ```
/// use rc_link::protocol::decoder::reconstruct_throttle;
///
/// assert_eq!(reconstruct_throttle(1, 2, 3, 4), 1234);
/// assert_eq!(reconstruct_throttle(0, 0, 12, 0), 120);
/// ```
#[must_use]
pub fn reconstruct_throttle(d3: u8, d2: u8, d1: u8, d0: u8) -> u32 {
    u32::from(d3) * 1000 + u32::from(d2) * 100 + u32::from(d1) * 10 + u32::from(d0)
}

/// Steering compare value: `scale * throttle`, truncated toward zero
///
/// # Examples
///
/// ```
/// use rc_link::protocol::decoder::compute_steering_pwm;
///
/// assert_eq!(compute_steering_pwm(1.7, 3), 5);
/// ```
#[must_use]
pub fn compute_steering_pwm(scale: f64, throttle: u32) -> u32 {
    // `as` truncates toward zero and saturates at the integer bounds
    (scale * f64::from(throttle)) as u32
}

/// Decode one packet against the previous actuation state
///
/// # Arguments
///
/// * `packet` - Received control packet
/// * `prior` - State produced by the previous iteration
///
/// # Returns
///
/// * `ActuationState` - New targets; fields whose symbol was not recognized
///   are copied from `prior`
///
/// # Examples
///
/// ```
/// use rc_link::protocol::decoder::{decode_and_actuate, ActuationState};
/// use rc_link::protocol::packet::ControlPacket;
///
/// let packet = ControlPacket::from_bytes([b'P', b'H', 1, 2, 3, 4, b' ']);
/// let state = decode_and_actuate(&packet, &ActuationState::default());
///
/// assert_eq!(state.drive_duty, 1000);
/// assert_eq!(state.steering_pwm, 1727);
/// ```
#[must_use]
pub fn decode_and_actuate(packet: &ControlPacket, prior: &ActuationState) -> ActuationState {
    let drive_duty = select_drive_duty(packet.steering_byte()).unwrap_or(prior.drive_duty);
    let scale = select_steering_scale(packet.speed_cap_byte()).unwrap_or(prior.scale);

    let [d3, d2, d1, d0] = packet.digits();
    let throttle = reconstruct_throttle(d3, d2, d1, d0);

    ActuationState {
        drive_duty,
        scale,
        steering_pwm: compute_steering_pwm(scale, throttle),
    }
}
