//! # Input Module
//!
//! Joystick readings consumed by the transmitter.

pub mod sample;

pub use sample::{JoystickSample, LineSource, SampleSource, ADC_MAX};
