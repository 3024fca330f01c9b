//! # Actuator Module
//!
//! Where the receiver hands its PWM compare values.
//!
//! On the vehicle these land in two timer compare registers; on a host the
//! [`LogActuator`] just reports them.

use tracing::{debug, trace};

use crate::error::Result;
use crate::protocol::decoder::ActuationState;

/// Applies actuation targets to the outputs
#[cfg_attr(test, mockall::automock)]
pub trait ActuatorSink: Send {
    /// Apply the targets produced by one decode iteration.
    fn apply(&mut self, state: &ActuationState) -> Result<()>;
}

/// Sink that logs compare values instead of driving hardware
///
/// Changes are logged at debug level, repeats at trace level. Periodic
/// summaries come from the receive loop.
#[derive(Debug, Default)]
pub struct LogActuator {
    last: Option<ActuationState>,
}

impl LogActuator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last applied targets, if any.
    #[must_use]
    pub fn last(&self) -> Option<&ActuationState> {
        self.last.as_ref()
    }
}

impl ActuatorSink for LogActuator {
    fn apply(&mut self, state: &ActuationState) -> Result<()> {
        if self.last.as_ref() == Some(state) {
            trace!(
                drive_duty = state.drive_duty,
                steering_pwm = state.steering_pwm,
                "Actuation unchanged"
            );
        } else {
            debug!(
                drive_duty = state.drive_duty,
                scale = state.scale,
                steering_pwm = state.steering_pwm,
                "Actuation updated"
            );
        }
        self.last = Some(*state);
        Ok(())
    }
}
