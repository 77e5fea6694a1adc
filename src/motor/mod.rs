// Motor actuation for the differential-drive car
//
// Provides:
// - Motion intent -> per-side direction/duty mapping
// - Pin bus trait with simulated and serial-bridge backends
// - Drive output that writes commands to the pins in a safe order

pub mod bridge;
mod driver;
pub mod mapping;
pub mod pins;

pub use bridge::{BridgeError, SerialPinBridge};
pub use driver::{DriveOutput, SidePins, LEFT_PINS, RIGHT_PINS};
pub use mapping::{actuation_for, actuation_with_skew};
pub use pins::{Level, PinBus, PinError, SimulatedPins};

#[cfg(test)]
pub(crate) use driver::tests::RecordingPins;
