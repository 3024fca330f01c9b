//! # RC Link Library
//!
//! Two-node remote control over a plain serial byte stream.
//!
//! The transmitter classifies joystick readings into command symbols and
//! throttle digits and sends them as a 7-byte packet. The receiver decodes
//! each packet into two PWM compare values for the drive and steering
//! outputs.

pub mod actuator;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod node;
pub mod protocol;
pub mod serial;
pub mod telemetry;
