//! # Control Protocol Module
//!
//! The 7-byte joystick control packet shared by both nodes.
//!
//! This module handles:
//! - Packet layout and command symbols
//! - Threshold classification and digit encoding (transmitter side)
//! - Symbol selection and PWM computation (receiver side)

pub mod packet;
pub mod encoder;
pub mod decoder;
