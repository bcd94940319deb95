//! Commutation driver over an abstract three-phase bridge
//!
//! Wraps the hardware half-bridges behind the [`PhaseBridge`] trait so the
//! switching order can be exercised with a stub in tests. The driver applies
//! one drive state at a time; the turn-off pass for every output strictly
//! precedes the turn-on pass, so both sides of a phase leg are never
//! conducting at once.

use crate::system::commutation::DRIVE_TABLE;

/// PWM period for the low-side outputs in microseconds
pub const PWM_PERIOD_US: u16 = 2000;

/// Maximum admissible low-side pulse width.
///
/// Hard hardware limit: the low side must never exceed 50% duty. Setpoint
/// producers clamp to this before publishing; `apply` trusts its input.
pub const MAX_TORQUE_US: u16 = PWM_PERIOD_US / 2;

/// Pulse width used while holding the rotor during alignment
pub const ALIGN_TORQUE_US: u16 = MAX_TORQUE_US;

/// Motor phase identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Phase {
    L1,
    L2,
    L3,
}

const PHASES: [Phase; 3] = [Phase::L1, Phase::L2, Phase::L3];

/// Abstract sink for the six phase outputs.
///
/// The high side is binary on/off; the low side carries a pulse width.
pub trait PhaseBridge {
    fn set_high(&mut self, phase: Phase, on: bool);
    fn set_low_duty(&mut self, phase: Phase, pulse_us: u16);
}

/// Applies drive states to a [`PhaseBridge`]
pub struct Commutator<B: PhaseBridge> {
    bridge: B,
}

impl<B: PhaseBridge> Commutator<B> {
    pub fn new(bridge: B) -> Self {
        Self { bridge }
    }

    /// Energizes the windings for `drive_state` with the given pulse width.
    ///
    /// De-asserts every output not commanded by the pattern before asserting
    /// the commanded ones, one pass each over all three legs.
    pub fn apply(&mut self, drive_state: u8, torque_us: u16) {
        let pattern = DRIVE_TABLE[(drive_state & 0x07) as usize];

        // Turn off first
        for (i, phase) in PHASES.into_iter().enumerate() {
            let low_bit = 1u8 << (2 * i);
            let high_bit = 1u8 << (2 * i + 1);
            if pattern & low_bit == 0 {
                self.bridge.set_low_duty(phase, 0);
            }
            if pattern & high_bit == 0 {
                self.bridge.set_high(phase, false);
            }
        }

        // Then turn on
        for (i, phase) in PHASES.into_iter().enumerate() {
            let low_bit = 1u8 << (2 * i);
            let high_bit = 1u8 << (2 * i + 1);
            if pattern & low_bit != 0 {
                self.bridge.set_low_duty(phase, torque_us);
            }
            if pattern & high_bit != 0 {
                self.bridge.set_high(phase, true);
            }
        }
    }

    /// Holds the rotor at drive state 0 for the alignment settle.
    ///
    /// The caller waits for mechanical rest and then decodes the sensors;
    /// that reading is the origin offset.
    pub fn hold_alignment(&mut self) {
        self.apply(0, ALIGN_TORQUE_US);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::commutation::decode_rotor;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        High(Phase, bool),
        Low(Phase, u16),
    }

    /// Records every switching operation in order
    struct RecordingBridge {
        ops: heapless::Vec<Op, 16>,
    }

    impl RecordingBridge {
        fn new() -> Self {
            Self {
                ops: heapless::Vec::new(),
            }
        }
    }

    impl PhaseBridge for RecordingBridge {
        fn set_high(&mut self, phase: Phase, on: bool) {
            self.ops.push(Op::High(phase, on)).unwrap();
        }

        fn set_low_duty(&mut self, phase: Phase, pulse_us: u16) {
            self.ops.push(Op::Low(phase, pulse_us)).unwrap();
        }
    }

    fn is_on(op: &Op) -> bool {
        match op {
            Op::High(_, on) => *on,
            Op::Low(_, duty) => *duty > 0,
        }
    }

    #[test]
    fn no_leg_conducts_on_both_sides() {
        for ds in 0..6u8 {
            let pattern = DRIVE_TABLE[ds as usize];
            for i in 0..3 {
                let pair = (pattern >> (2 * i)) & 0x03;
                assert_ne!(pair, 0x03, "drive state {} leg {}", ds, i);
            }
        }
    }

    #[test]
    fn all_offs_precede_all_ons() {
        for ds in 0..6u8 {
            let mut commutator = Commutator::new(RecordingBridge::new());
            commutator.apply(ds, 500);
            let ops = &commutator.bridge.ops;
            assert_eq!(ops.len(), 6);
            let first_on = ops.iter().position(is_on).unwrap();
            assert!(
                ops[first_on..].iter().all(is_on),
                "turn-on interleaved with turn-off in drive state {}",
                ds
            );
        }
    }

    #[test]
    fn invalid_drive_states_switch_everything_off() {
        for ds in [6u8, 7] {
            let mut commutator = Commutator::new(RecordingBridge::new());
            commutator.apply(ds, 500);
            assert!(commutator.bridge.ops.iter().all(|op| !is_on(op)));
        }
    }

    #[test]
    fn alignment_is_idempotent_for_a_still_rotor() {
        let mut commutator = Commutator::new(RecordingBridge::new());
        let sensor_bits = 0b011;
        commutator.hold_alignment();
        let first = decode_rotor(sensor_bits);
        commutator.hold_alignment();
        let second = decode_rotor(sensor_bits);
        assert_eq!(first, second);
    }
}
