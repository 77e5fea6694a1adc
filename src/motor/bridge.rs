// Serial pin bridge
//
// A small microcontroller on the motor board exposes its GPIO and PWM pins
// over a serial link. Each write is one fire-and-forget frame:
// [0xFF, 0xFF, Instruction, Pin, ValueLo, ValueHi, Checksum]

use serialport::{self, SerialPort};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

use super::pins::{Level, PinBus, PinError};
use crate::config::PWM_MAX;

pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Frame header bytes
const HEADER: [u8; 2] = [0xFF, 0xFF];

/// Bridge instruction set
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    DigitalWrite = 0x01,
    PwmWrite = 0x02,
}

/// Error types for bridge communication
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pin bus backed by a serial-attached GPIO/PWM expander
pub struct SerialPinBridge {
    port: Box<dyn SerialPort>,
}

impl SerialPinBridge {
    /// Open the bridge on a serial port
    pub fn open(port_name: &str, baudrate: u32) -> Result<Self, BridgeError> {
        info!("Opening pin bridge on {} @ {} baud", port_name, baudrate);
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self { port })
    }

    /// Checksum over everything after the header
    fn checksum(data: &[u8]) -> u8 {
        let sum: u16 = data.iter().map(|&b| b as u16).sum();
        (!sum & 0xFF) as u8
    }

    fn build_frame(instruction: Instruction, pin: u8, value: u16) -> [u8; 7] {
        let [lo, hi] = value.to_le_bytes();
        let body = [instruction as u8, pin, lo, hi];
        let checksum = Self::checksum(&body);
        [
            HEADER[0], HEADER[1], body[0], body[1], body[2], body[3], checksum,
        ]
    }

    fn send_frame(&mut self, frame: &[u8]) -> Result<(), BridgeError> {
        self.port.write_all(frame)?;
        self.port.flush()?;
        Ok(())
    }
}

impl PinBus for SerialPinBridge {
    fn digital_write(&mut self, pin: u8, level: Level) -> Result<(), PinError> {
        let value = u16::from(level == Level::High);
        let frame = Self::build_frame(Instruction::DigitalWrite, pin, value);
        debug!("Bridge digital write: pin={}, level={:?}", pin, level);
        self.send_frame(&frame)?;
        Ok(())
    }

    fn pwm_write(&mut self, pin: u8, duty: u16) -> Result<(), PinError> {
        if duty > PWM_MAX {
            return Err(PinError::DutyOutOfRange {
                pin,
                duty,
                max: PWM_MAX,
            });
        }
        let frame = Self::build_frame(Instruction::PwmWrite, pin, duty);
        debug!("Bridge pwm write: pin={}, duty={}", pin, duty);
        self.send_frame(&frame)?;
        Ok(())
    }
}
