// Timeouts, speed limits, pins, topics, command line
use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::command::Vocabulary;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 100;

// Stop the car if no command arrives for this long
pub const COMMAND_TIMEOUT: Duration = Duration::from_millis(300);

// UDP
pub const UDP_PORT: u16 = 4210;
pub const RECV_BUFFER_LEN: usize = 255;

// Speed governor (PWM units, 10-bit)
pub const DEFAULT_SPEED: u16 = 512;
pub const MIN_SPEED: u16 = 400;
pub const MAX_SPEED: u16 = 1023;
pub const SPEED_STEP: u16 = 100;

// PWM ceiling of the enable pins
pub const PWM_MAX: u16 = 1023;

// Duty added to one side and removed from the other on a pivot
pub const PIVOT_SKEW: u16 = 400;

// Motor driver pins (NodeMCU GPIO numbers)
pub const PIN_LEFT_FWD: u8 = 5; // D1
pub const PIN_LEFT_BWD: u8 = 4; // D2
pub const PIN_RIGHT_FWD: u8 = 0; // D3
pub const PIN_RIGHT_BWD: u8 = 2; // D4
pub const PIN_LEFT_EN: u8 = 14; // D5, PWM
pub const PIN_RIGHT_EN: u8 = 12; // D6, PWM

// Serial pin bridge
pub const BRIDGE_BAUDRATE: u32 = 115_200;

// Zenoh telemetry topics
pub const TOPIC_RT_DRIVE: &str = "rccar/rt/drive"; // actuation
pub const TOPIC_HEALTH: &str = "rccar/state/health"; // health status

/// Command line for the drive runtime
#[derive(Debug, Clone, Parser)]
#[command(name = "rc-drive-runtime", about = "UDP remote control runtime for a differential-drive car")]
pub struct RuntimeArgs {
    /// Address to receive command datagrams on
    #[arg(long, default_value_t = SocketAddr::from(([0, 0, 0, 0], UDP_PORT)))]
    pub bind: SocketAddr,

    /// Command symbol set sent by the controller
    #[arg(long, value_enum, default_value_t = Vocabulary::Extended)]
    pub vocabulary: Vocabulary,

    /// Serial port of the pin bridge; pins are simulated when omitted
    #[arg(long)]
    pub bridge: Option<String>,

    #[arg(long, default_value_t = BRIDGE_BAUDRATE)]
    pub baud: u32,

    /// Publish actuation and health over zenoh
    #[arg(long)]
    pub telemetry: bool,
}
