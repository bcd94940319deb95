//! Hall-edge commutation handler
//!
//! Reacts to every transition on the three photo-interrupter lines: re-reads
//! the rotor state, energizes the matching phase pattern with the current
//! torque and lead setpoints, and accumulates the signed position delta.
//! Also services the stall jolt from the control loop, which is the same
//! commutation step fired outside the edge cadence.
//!
//! The loop body never blocks and takes no locks; the shared setpoints are
//! single atomic loads.

use core::sync::atomic::Ordering;

use defmt::{info, warn};
use embassy_futures::select::select4;
use embassy_rp::gpio::{Input, Level, Output};
use embassy_rp::pwm;

use crate::system::commutation::{decode_rotor, drive_state, step_delta, INVALID_ROTOR_STATE};
use crate::system::motor::{Commutator, Phase, PhaseBridge, PWM_PERIOD_US};
use crate::system::resources::PhaseBridgeResources;
use crate::system::state::{PHASE_LEAD, POSITION, STALL_JOLT, TORQUE};

/// Three-phase bridge on RP2350 pins.
///
/// High sides are plain outputs; low sides are the B outputs of three PWM
/// slices running at the shared commutation PWM period (GPIO 3/5/7 are the
/// B channels of slices 1/2/3).
pub struct RpPhaseBridge {
    highs: [Output<'static>; 3],
    lows: [pwm::Pwm<'static>; 3],
    configs: [pwm::Config; 3],
    counts_per_us: u32,
}

impl RpPhaseBridge {
    pub fn new(r: PhaseBridgeResources) -> Self {
        // 2000us period -> 500Hz. Divide the system clock down far enough
        // to keep the wrap value inside the 16-bit counter.
        let desired_freq_hz = 1_000_000 / PWM_PERIOD_US as u32;
        let clock_freq_hz = embassy_rp::clocks::clk_sys_freq();
        let divider = ((clock_freq_hz / desired_freq_hz) / 65535 + 1) as u8;
        let top = (clock_freq_hz / (desired_freq_hz * divider as u32)) as u16 - 1;
        let counts_per_us = (top as u32 + 1) / PWM_PERIOD_US as u32;

        let mut config = pwm::Config::default();
        config.divider = divider.into();
        config.top = top;
        config.compare_b = 0;

        let highs = [
            Output::new(r.l1_high_pin, Level::Low),
            Output::new(r.l2_high_pin, Level::Low),
            Output::new(r.l3_high_pin, Level::Low),
        ];
        let lows = [
            pwm::Pwm::new_output_b(r.l1_low_slice, r.l1_low_pin, config.clone()),
            pwm::Pwm::new_output_b(r.l2_low_slice, r.l2_low_pin, config.clone()),
            pwm::Pwm::new_output_b(r.l3_low_slice, r.l3_low_pin, config.clone()),
        ];

        Self {
            highs,
            lows,
            configs: [config.clone(), config.clone(), config],
            counts_per_us,
        }
    }
}

impl PhaseBridge for RpPhaseBridge {
    fn set_high(&mut self, phase: Phase, on: bool) {
        let i = phase as usize;
        if on {
            self.highs[i].set_high();
        } else {
            self.highs[i].set_low();
        }
    }

    fn set_low_duty(&mut self, phase: Phase, pulse_us: u16) {
        let i = phase as usize;
        self.configs[i].compare_a = (pulse_us as u32 * self.counts_per_us) as u16;
        self.lows[i].set_config(&self.configs[i]);
    }
}

/// Combines the three sensor lines into the 3-bit value I1 + 2*I2 + 4*I3
pub fn sensor_bits(i1: &Input<'_>, i2: &Input<'_>, i3: &Input<'_>) -> u8 {
    i1.is_high() as u8 | (i2.is_high() as u8) << 1 | (i3.is_high() as u8) << 2
}

/// Edge-driven commutation task
#[embassy_executor::task]
pub async fn commutate(
    mut commutator: Commutator<RpPhaseBridge>,
    mut i1: Input<'static>,
    mut i2: Input<'static>,
    mut i3: Input<'static>,
    origin: u8,
) {
    info!("Commutation handler started, origin {}", origin);

    // Rotor was decoded at the origin during alignment
    let mut prev_rotor = origin;

    loop {
        select4(
            i1.wait_for_any_edge(),
            i2.wait_for_any_edge(),
            i3.wait_for_any_edge(),
            STALL_JOLT.wait(),
        )
        .await;

        let rotor = decode_rotor(sensor_bits(&i1, &i2, &i3));
        if rotor == INVALID_ROTOR_STATE {
            warn!("invalid sensor reading, skipping commutation");
            continue;
        }

        let lead = PHASE_LEAD.load(Ordering::Relaxed);
        let torque = TORQUE.load(Ordering::Relaxed);
        commutator.apply(drive_state(rotor, origin, lead), torque);

        POSITION.fetch_add(step_delta(prev_rotor, rotor), Ordering::Relaxed);
        prev_rotor = rotor;
    }
}
