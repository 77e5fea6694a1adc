// Drive output for the two-sided motor driver
//
// Applies an `ActuatorCommand` to the pin bus: two exclusive direction pins
// and one PWM enable pin per side.

use tracing::{debug, info, warn};

use super::pins::{Level, PinBus, PinError};
use crate::config::{
    PIN_LEFT_BWD, PIN_LEFT_EN, PIN_LEFT_FWD, PIN_RIGHT_BWD, PIN_RIGHT_EN, PIN_RIGHT_FWD,
};
use crate::messages::{ActuatorCommand, Direction, SideOutput};

/// Pins driving one side of the car
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidePins {
    pub forward: u8,
    pub backward: u8,
    pub enable: u8,
}

pub const LEFT_PINS: SidePins = SidePins {
    forward: PIN_LEFT_FWD,
    backward: PIN_LEFT_BWD,
    enable: PIN_LEFT_EN,
};

pub const RIGHT_PINS: SidePins = SidePins {
    forward: PIN_RIGHT_FWD,
    backward: PIN_RIGHT_BWD,
    enable: PIN_RIGHT_EN,
};

/// Thin adapter between actuator commands and a pin bus
pub struct DriveOutput<P: PinBus> {
    pins: P,
    left: SidePins,
    right: SidePins,
    current: ActuatorCommand,
}

impl<P: PinBus> DriveOutput<P> {
    /// Create a drive output on the default pins and put the motors in the stopped state
    pub fn new(pins: P) -> Result<Self, PinError> {
        Self::with_pins(pins, LEFT_PINS, RIGHT_PINS)
    }

    /// Create with custom pin assignments
    pub fn with_pins(pins: P, left: SidePins, right: SidePins) -> Result<Self, PinError> {
        let mut output = Self {
            pins,
            left,
            right,
            current: ActuatorCommand::stop(),
        };
        // Every pin is written, whatever state the board powered up in
        output.write_all(&ActuatorCommand::stop())?;
        info!("Drive output initialized, motors stopped");
        Ok(output)
    }

    /// Issue a command to both sides
    pub fn apply(&mut self, cmd: &ActuatorCommand) -> Result<(), PinError> {
        debug!(
            "Applying actuation: left={:?}/{}, right={:?}/{}",
            cmd.left.direction, cmd.left.duty, cmd.right.direction, cmd.right.duty
        );
        self.write_all(cmd)
    }

    /// Stop both sides
    pub fn stop(&mut self) -> Result<(), PinError> {
        self.apply(&ActuatorCommand::stop())
    }

    /// Last command issued to the hardware
    pub fn current(&self) -> ActuatorCommand {
        self.current
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    fn write_all(&mut self, cmd: &ActuatorCommand) -> Result<(), PinError> {
        let (left, right) = (self.left, self.right);
        write_side(&mut self.pins, left, cmd.left)?;
        write_side(&mut self.pins, right, cmd.right)?;
        self.current = *cmd;
        Ok(())
    }
}

/// Direction pins are released before being asserted so that forward and
/// backward are never high together, not even between two writes.
fn write_side<P: PinBus>(bus: &mut P, pins: SidePins, side: SideOutput) -> Result<(), PinError> {
    match side.direction {
        Direction::Forward => {
            bus.digital_write(pins.backward, Level::Low)?;
            bus.digital_write(pins.forward, Level::High)?;
        }
        Direction::Backward => {
            bus.digital_write(pins.forward, Level::Low)?;
            bus.digital_write(pins.backward, Level::High)?;
        }
        Direction::Neutral => {
            bus.digital_write(pins.forward, Level::Low)?;
            bus.digital_write(pins.backward, Level::Low)?;
        }
    }
    bus.pwm_write(pins.enable, side.duty)
}

impl<P: PinBus> Drop for DriveOutput<P> {
    fn drop(&mut self) {
        // Try to stop motors when the output is dropped
        if let Err(e) = self.stop() {
            warn!("Failed to stop motors on drop: {}", e);
        }
    }
}
