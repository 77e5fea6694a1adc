// Message types flowing through the runtime

use serde::{Deserialize, Serialize};

/// Hardware-independent description of what the car should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionIntent {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    PivotForwardLeft,
    PivotForwardRight,
    PivotBackwardLeft,
    PivotBackwardRight,
    Stop,
    SpeedUp,
    SpeedDown,
    NoOp,
}

/// Direction of one drive side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
    #[default]
    Neutral,
}

/// Direction and duty for one drive side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideOutput {
    pub direction: Direction,
    pub duty: u16,
}

impl SideOutput {
    pub fn new(direction: Direction, duty: u16) -> Self {
        Self { direction, duty }
    }
}

// Actuation output from runtime -> motor driver pins
// Default is both sides neutral with zero duty (stopped)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActuatorCommand {
    pub left: SideOutput,
    pub right: SideOutput,
}

impl ActuatorCommand {
    pub fn stop() -> Self {
        Self::default()
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_serializes_snake_case() {
        let json = serde_json::to_string(&MotionIntent::PivotForwardLeft).unwrap();
        assert_eq!(json, "\"pivot_forward_left\"");
    }

    #[test]
    fn test_health_serializes_snake_case() {
        let json = serde_json::to_string(&RuntimeHealth::CmdStale).unwrap();
        assert_eq!(json, "\"cmd_stale\"");
    }

    #[test]
    fn test_actuator_command_json_shape() {
        let cmd = ActuatorCommand {
            left: SideOutput::new(Direction::Forward, 512),
            right: SideOutput::new(Direction::Backward, 300),
        };
        let value = serde_json::to_value(cmd).unwrap();
        assert_eq!(value["left"]["direction"], "forward");
        assert_eq!(value["left"]["duty"], 512);
        assert_eq!(value["right"]["direction"], "backward");
    }
}
