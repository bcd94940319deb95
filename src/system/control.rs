//! Hybrid velocity/position controller
//!
//! Pure per-tick control math for the 10 Hz loop. Blends a proportional
//! velocity term and a PD position term into one signed torque, then splits
//! it into a rotation direction (phase lead) and a clamped pulse width.

use libm::fabsf;

use crate::system::commutation::STEPS_PER_REV;
use crate::system::motor::MAX_TORQUE_US;

/// Control loop rate
pub const TICKS_PER_SECOND: f32 = 10.0;

/// Velocity loop proportional gain
const K_P_SPEED: f32 = 20.0;

/// Position loop proportional gain
const K_P_POS: f32 = 15.0;

/// Position loop derivative gain
const K_D_POS: f32 = 28.0;

/// Snapshot of the shared targets, taken once per tick
#[derive(Debug, Clone, Copy, Default)]
pub struct Targets {
    /// Target velocity in revolutions/sec; 0 means "seek the position target"
    pub velocity: f32,
    /// Target position in revolutions
    pub position: f32,
}

/// Output of one control iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorqueCommand {
    /// Phase lead: +2 forward, -2 reverse
    pub lead: i8,
    /// Clamped pulse width magnitude
    pub torque_us: u16,
    /// Measured velocity in steps/sec, for reporting and stall detection
    pub velocity: f32,
}

impl TorqueCommand {
    /// True when the rotor did not move during the last tick; the caller
    /// fires a synchronous commutation jolt to break static friction.
    pub fn stalled(&self) -> bool {
        self.velocity == 0.0
    }
}

/// Per-tick controller state
pub struct ControlLoop {
    prev_pos: i32,
    prev_pos_err: f32,
}

impl ControlLoop {
    pub fn new() -> Self {
        Self {
            prev_pos: 0,
            prev_pos_err: 0.0,
        }
    }

    /// Runs one control iteration against a single position snapshot.
    ///
    /// `pos` must be read exactly once per tick; re-reading mid-iteration
    /// would mix pre- and post-update values in the velocity math.
    pub fn step(&mut self, pos: i32, targets: Targets) -> TorqueCommand {
        let velocity = (pos - self.prev_pos) as f32 * TICKS_PER_SECOND;
        self.prev_pos = pos;

        let pos_err = targets.position - pos as f32 / STEPS_PER_REV as f32;

        let speed_torque = select_speed_torque(targets.velocity, velocity, pos_err);
        let position_torque =
            K_P_POS * pos_err - K_D_POS * (pos_err - self.prev_pos_err);
        self.prev_pos_err = pos_err;

        // Pick whichever loop pulls the rotor back toward its target. When
        // spinning backwards the larger (more positive) demand wins, when
        // spinning forwards the smaller one does.
        let torque = if velocity < 0.0 {
            if speed_torque > position_torque {
                speed_torque
            } else {
                position_torque
            }
        } else if speed_torque < position_torque {
            speed_torque
        } else {
            position_torque
        };

        let (lead, magnitude) = if torque < 0.0 {
            (-2, -torque)
        } else {
            (2, torque)
        };

        TorqueCommand {
            lead,
            torque_us: clamp_torque(magnitude),
            velocity,
        }
    }
}

/// Velocity-loop torque demand.
///
/// A zero velocity target saturates the speed loop at full authority instead
/// of computing a near-zero demand that would stall the position loop.
fn select_speed_torque(target_vel: f32, velocity: f32, pos_err: f32) -> f32 {
    if target_vel == 0.0 {
        return MAX_TORQUE_US as f32;
    }
    let demand = K_P_SPEED * (target_vel * STEPS_PER_REV as f32 - fabsf(velocity));
    if pos_err < 0.0 {
        -demand
    } else {
        demand
    }
}

/// Clamps a torque magnitude to the admissible pulse-width range
pub fn clamp_torque(magnitude: f32) -> u16 {
    if magnitude >= MAX_TORQUE_US as f32 {
        MAX_TORQUE_US
    } else if magnitude <= 0.0 {
        0
    } else {
        magnitude as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blend(velocity: f32, speed_torque: f32, position_torque: f32) -> f32 {
        if velocity < 0.0 {
            if speed_torque > position_torque {
                speed_torque
            } else {
                position_torque
            }
        } else if speed_torque < position_torque {
            speed_torque
        } else {
            position_torque
        }
    }

    #[test]
    fn blend_prefers_max_when_reversing_and_min_when_forward() {
        assert_eq!(blend(-3.0, 10.0, 4.0), 10.0);
        assert_eq!(blend(3.0, 10.0, 4.0), 4.0);
    }

    #[test]
    fn zero_velocity_target_saturates_the_speed_loop() {
        for velocity in [-120.0f32, 0.0, 55.5, 900.0] {
            let torque = select_speed_torque(0.0, velocity, 1.0);
            assert_eq!(torque, MAX_TORQUE_US as f32);
        }
    }

    #[test]
    fn speed_torque_sign_follows_position_error() {
        let ahead = select_speed_torque(10.0, 0.0, 1.0);
        let behind = select_speed_torque(10.0, 0.0, -1.0);
        assert_eq!(ahead, -behind);
    }

    #[test]
    fn velocity_derives_from_position_delta() {
        let mut lp = ControlLoop::new();
        lp.step(0, Targets::default());
        let cmd = lp.step(12, Targets::default());
        assert_eq!(cmd.velocity, 120.0);
    }

    #[test]
    fn negative_torque_selects_reverse_lead() {
        let mut lp = ControlLoop::new();
        // Rotor well past a zero position target: position loop pulls back
        lp.step(600, Targets::default());
        let cmd = lp.step(600, Targets {
            velocity: 0.0,
            position: 0.0,
        });
        assert_eq!(cmd.lead, -2);
        assert!(cmd.torque_us > 0);
    }

    #[test]
    fn torque_magnitude_never_exceeds_the_duty_ceiling() {
        assert_eq!(clamp_torque(1e9), MAX_TORQUE_US);
        assert_eq!(clamp_torque(-25.0), 0);
        assert_eq!(clamp_torque(321.7), 321);
        let mut lp = ControlLoop::new();
        let cmd = lp.step(
            1_000_000,
            Targets {
                velocity: 500.0,
                position: -500.0,
            },
        );
        assert!(cmd.torque_us <= MAX_TORQUE_US);
    }

    #[test]
    fn stall_is_flagged_only_at_exactly_zero_velocity() {
        let mut lp = ControlLoop::new();
        assert!(lp.step(0, Targets::default()).stalled());
        assert!(!lp.step(1, Targets::default()).stalled());
    }
}
