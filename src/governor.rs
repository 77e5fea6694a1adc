// Speed governor: base speed with clamped fixed-step adjustment

use tracing::info;

use crate::config::{DEFAULT_SPEED, MAX_SPEED, MIN_SPEED, SPEED_STEP};

/// Holds the base speed shared by every motion intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedGovernor {
    speed: u16,
    min: u16,
    max: u16,
    step: u16,
}

impl Default for SpeedGovernor {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedGovernor {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_SPEED, MIN_SPEED, MAX_SPEED, SPEED_STEP)
    }

    /// Create with custom limits. The initial speed is clamped into `[min, max]`.
    pub fn with_limits(initial: u16, min: u16, max: u16, step: u16) -> Self {
        debug_assert!(min <= max, "speed floor above ceiling");
        Self {
            speed: initial.clamp(min, max),
            min,
            max,
            step,
        }
    }

    pub fn speed(&self) -> u16 {
        self.speed
    }

    pub fn increase(&mut self) -> u16 {
        self.speed = self.speed.saturating_add(self.step).min(self.max);
        info!("Speed increased to: {}", self.speed);
        self.speed
    }

    pub fn decrease(&mut self) -> u16 {
        self.speed = self.speed.saturating_sub(self.step).max(self.min);
        info!("Speed decreased to: {}", self.speed);
        self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_speed() {
        assert_eq!(SpeedGovernor::new().speed(), 512);
    }

    #[test]
    fn test_step_up_and_down() {
        let mut gov = SpeedGovernor::new();
        assert_eq!(gov.increase(), 612);
        assert_eq!(gov.increase(), 712);
        assert_eq!(gov.decrease(), 612);
    }

    #[test]
    fn test_clamps_at_ceiling() {
        let mut gov = SpeedGovernor::new();
        for _ in 0..10 {
            gov.increase();
        }
        assert_eq!(gov.speed(), MAX_SPEED);
        gov.increase();
        assert_eq!(gov.speed(), MAX_SPEED);
    }

    #[test]
    fn test_clamps_at_floor() {
        let mut gov = SpeedGovernor::new();
        assert_eq!(gov.decrease(), 412);
        assert_eq!(gov.decrease(), MIN_SPEED);
        assert_eq!(gov.decrease(), MIN_SPEED);
    }

    #[test]
    fn test_zero_floor_does_not_underflow() {
        let mut gov = SpeedGovernor::with_limits(150, 0, MAX_SPEED, SPEED_STEP);
        assert_eq!(gov.decrease(), 50);
        assert_eq!(gov.decrease(), 0);
        assert_eq!(gov.decrease(), 0);
    }

    #[test]
    fn test_any_sequence_stays_in_range() {
        let mut gov = SpeedGovernor::new();
        // deterministic pseudo-random walk
        let mut seed: u32 = 0x1234_5678;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            if seed & 0x100 == 0 {
                gov.increase();
            } else {
                gov.decrease();
            }
            assert!((MIN_SPEED..=MAX_SPEED).contains(&gov.speed()));
        }
    }

    #[test]
    fn test_initial_speed_is_clamped() {
        let gov = SpeedGovernor::with_limits(2000, MIN_SPEED, MAX_SPEED, SPEED_STEP);
        assert_eq!(gov.speed(), MAX_SPEED);
    }
}
