//! # Node Module
//!
//! Control loops for the two ends of the link.
//!
//! - [`Transmitter`]: joystick samples in, control packets out
//! - [`Receiver`]: control packets in, PWM compare values out
//!
//! Each loop is single-task and free-running; the only suspension points are
//! the serial reads and writes.

pub mod transmitter;
pub mod receiver;

pub use receiver::Receiver;
pub use transmitter::Transmitter;
