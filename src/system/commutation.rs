//! Six-step commutation tables and rotor-state arithmetic
//!
//! Pure lookup and ring arithmetic shared by the edge handler and the
//! alignment routine. The rotor moves through six electrical states per
//! revolution; three photo-interrupter lines report the current state as a
//! 3-bit value.

/// Drive state to phase output pattern.
///
/// Bit layout per phase pair: 0x01/0x02 = L1 low/high, 0x04/0x08 = L2
/// low/high, 0x10/0x20 = L3 low/high. Entries 6 and 7 are all-off so an
/// out-of-range index can never energize a winding.
pub const DRIVE_TABLE: [u8; 8] = [0x12, 0x18, 0x09, 0x21, 0x24, 0x06, 0x00, 0x00];

/// Sensor bits to rotor state.
///
/// Inputs 0 (all lines low) and 7 (all lines high) are physically impossible
/// in normal operation and map to the invalid sentinel.
pub const STATE_MAP: [u8; 8] = [7, 5, 3, 4, 1, 0, 2, 7];

/// Sentinel for an undecodable sensor reading. Never commutate on this.
pub const INVALID_ROTOR_STATE: u8 = 7;

/// Commutation steps per electrical revolution
pub const STEPS_PER_REV: i32 = 6;

/// Converts raw sensor line bits (I1 + 2*I2 + 4*I3) to a rotor state
pub fn decode_rotor(sensor_bits: u8) -> u8 {
    STATE_MAP[(sensor_bits & 0x07) as usize]
}

/// Computes the drive state for a sensed rotor state.
///
/// `lead` is +2 for forward torque, -2 for reverse. The subtraction can go
/// negative, so the sum is normalized with `rem_euclid` before reducing to
/// the six-state ring.
pub fn drive_state(rotor: u8, origin: u8, lead: i8) -> u8 {
    (rotor as i16 - origin as i16 + lead as i16 + 6).rem_euclid(6) as u8
}

/// Signed position delta between two consecutive rotor states.
///
/// The rotor state is a mod-6 ring, so a single physical step across the
/// wrap shows up as a raw difference of +/-5 and must be folded back to the
/// true -/+1 step.
pub fn step_delta(prev: u8, now: u8) -> i32 {
    match now as i32 - prev as i32 {
        5 => -1,
        -5 => 1,
        d => d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_impossible_readings() {
        assert_eq!(decode_rotor(0), INVALID_ROTOR_STATE);
        assert_eq!(decode_rotor(7), INVALID_ROTOR_STATE);
        for bits in 1..7u8 {
            assert!(decode_rotor(bits) < 6);
        }
    }

    #[test]
    fn decode_is_a_permutation_of_valid_states() {
        let mut seen = [false; 6];
        for bits in 1..7u8 {
            seen[decode_rotor(bits) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn drive_state_stays_in_ring_for_both_leads() {
        for rotor in 0..6u8 {
            for origin in 0..6u8 {
                for lead in [2i8, -2] {
                    let ds = drive_state(rotor, origin, lead);
                    assert!(ds < 6, "rotor {} origin {} lead {}", rotor, origin, lead);
                }
            }
        }
    }

    #[test]
    fn drive_state_applies_lead_and_origin() {
        assert_eq!(drive_state(3, 1, 2), 4);
        assert_eq!(drive_state(0, 5, -2), (0 - 5 - 2i16).rem_euclid(6) as u8);
    }

    #[test]
    fn step_delta_folds_ring_wraparound() {
        assert_eq!(step_delta(5, 0), 1);
        assert_eq!(step_delta(0, 5), -1);
        assert_eq!(step_delta(2, 3), 1);
        assert_eq!(step_delta(3, 2), -1);
        assert_eq!(step_delta(4, 4), 0);
    }

    #[test]
    fn invalid_table_entries_are_all_off() {
        assert_eq!(DRIVE_TABLE[6], 0);
        assert_eq!(DRIVE_TABLE[7], 0);
    }
}
