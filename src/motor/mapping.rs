// Motion intent -> per-side direction and duty
//
// Pure mapping, no I/O. Turns rotate in place by driving the sides in
// opposite directions; pivots arc by skewing duty between the sides.

use crate::config::{PIVOT_SKEW, PWM_MAX};
use crate::messages::{ActuatorCommand, Direction, MotionIntent, SideOutput};

use crate::messages::Direction::{Backward as Bwd, Forward as Fwd};

/// Compute the actuation for an intent at the given base speed.
///
/// Returns `None` for `SpeedUp`, `SpeedDown` and `NoOp`, which leave the
/// hardware as it is.
pub fn actuation_for(intent: MotionIntent, base_speed: u16) -> Option<ActuatorCommand> {
    actuation_with_skew(intent, base_speed, PIVOT_SKEW)
}

/// Same as [`actuation_for`] with a custom pivot skew
pub fn actuation_with_skew(
    intent: MotionIntent,
    base_speed: u16,
    skew: u16,
) -> Option<ActuatorCommand> {
    let even = |left, right| {
        let duty = clamp_duty(i32::from(base_speed));
        both(left, duty, right, duty)
    };
    // slow side first, fast side second
    let slow = clamp_duty(i32::from(base_speed) - i32::from(skew));
    let fast = clamp_duty(i32::from(base_speed) + i32::from(skew));

    let cmd = match intent {
        MotionIntent::Forward => even(Fwd, Fwd),
        MotionIntent::Backward => even(Bwd, Bwd),
        MotionIntent::TurnLeft => even(Bwd, Fwd),
        MotionIntent::TurnRight => even(Fwd, Bwd),
        MotionIntent::PivotForwardLeft => both(Fwd, slow, Fwd, fast),
        MotionIntent::PivotForwardRight => both(Fwd, fast, Fwd, slow),
        MotionIntent::PivotBackwardLeft => both(Bwd, slow, Bwd, fast),
        MotionIntent::PivotBackwardRight => both(Bwd, fast, Bwd, slow),
        MotionIntent::Stop => ActuatorCommand::stop(),
        MotionIntent::SpeedUp | MotionIntent::SpeedDown | MotionIntent::NoOp => return None,
    };
    Some(cmd)
}

fn both(left: Direction, left_duty: u16, right: Direction, right_duty: u16) -> ActuatorCommand {
    ActuatorCommand {
        left: SideOutput::new(left, left_duty),
        right: SideOutput::new(right, right_duty),
    }
}

/// Clamp a signed duty into `[0, PWM_MAX]`
fn clamp_duty(duty: i32) -> u16 {
    duty.clamp(0, i32::from(PWM_MAX)) as u16
}
