// Pin bus abstraction for the motor driver board
//
// The drive output only needs two primitives: set a digital pin and set a
// PWM duty. Hardware backends implement `PinBus`.

use std::collections::BTreeMap;

use tracing::debug;

use super::bridge::BridgeError;

/// Logic level of a digital output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Error types for pin writes
#[derive(Debug, thiserror::Error)]
pub enum PinError {
    #[error("Pin bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Duty {duty} out of range for pin {pin} (max {max})")]
    DutyOutOfRange { pin: u8, duty: u16, max: u16 },
}

/// Digital and PWM outputs addressed by pin number
pub trait PinBus {
    fn digital_write(&mut self, pin: u8, level: Level) -> Result<(), PinError>;

    fn pwm_write(&mut self, pin: u8, duty: u16) -> Result<(), PinError>;
}

impl<P: PinBus + ?Sized> PinBus for Box<P> {
    fn digital_write(&mut self, pin: u8, level: Level) -> Result<(), PinError> {
        (**self).digital_write(pin, level)
    }

    fn pwm_write(&mut self, pin: u8, duty: u16) -> Result<(), PinError> {
        (**self).pwm_write(pin, duty)
    }
}

/// In-memory pin bus used when no hardware is attached
#[derive(Debug, Default)]
pub struct SimulatedPins {
    levels: BTreeMap<u8, Level>,
    duties: BTreeMap<u8, u16>,
}

impl SimulatedPins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last level written to a pin (`Low` if never written)
    pub fn level(&self, pin: u8) -> Level {
        self.levels.get(&pin).copied().unwrap_or(Level::Low)
    }

    /// Last duty written to a pin (0 if never written)
    pub fn duty(&self, pin: u8) -> u16 {
        self.duties.get(&pin).copied().unwrap_or(0)
    }
}

impl PinBus for SimulatedPins {
    fn digital_write(&mut self, pin: u8, level: Level) -> Result<(), PinError> {
        debug!("sim digital_write pin={} level={:?}", pin, level);
        self.levels.insert(pin, level);
        Ok(())
    }

    fn pwm_write(&mut self, pin: u8, duty: u16) -> Result<(), PinError> {
        debug!("sim pwm_write pin={} duty={}", pin, duty);
        self.duties.insert(pin, duty);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_pins_remember_last_write() {
        let mut pins = SimulatedPins::new();
        assert_eq!(pins.level(5), Level::Low);
        assert_eq!(pins.duty(14), 0);

        pins.digital_write(5, Level::High).unwrap();
        pins.pwm_write(14, 700).unwrap();
        assert_eq!(pins.level(5), Level::High);
        assert_eq!(pins.duty(14), 700);

        pins.digital_write(5, Level::Low).unwrap();
        assert_eq!(pins.level(5), Level::Low);
    }

    #[test]
    fn test_boxed_bus_forwards() {
        let mut pins: Box<dyn PinBus> = Box::new(SimulatedPins::new());
        assert!(pins.digital_write(4, Level::High).is_ok());
        assert!(pins.pwm_write(12, 10).is_ok());
    }
}
