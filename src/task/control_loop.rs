//! Periodic closed-loop motor control
//!
//! Wakes every 100ms, snapshots the position accumulator and targets exactly
//! once, runs the hybrid velocity/position controller and publishes the
//! resulting lead and torque for the edge handler. Every tenth tick it emits
//! velocity and position reports; a tick with zero measured velocity fires
//! the stall jolt.

use core::sync::atomic::Ordering;

use defmt::info;
use embassy_time::{Duration, Ticker};

use crate::system::control::ControlLoop;
use crate::system::event::{self, StatusEvent};
use crate::system::state::{self, CONTROL_TARGETS, PHASE_LEAD, POSITION, TORQUE};

/// Control tick period
const TICK: Duration = Duration::from_millis(100);

/// Ticks between velocity/position reports (~1s)
const REPORT_EVERY: u32 = 10;

#[embassy_executor::task]
pub async fn control_loop() {
    info!("Control loop started");

    let mut ticker = Ticker::every(TICK);
    let mut controller = ControlLoop::new();
    let mut tick: u32 = 0;

    loop {
        ticker.next().await;

        // One snapshot per tick; never re-read within the iteration
        let pos = POSITION.load(Ordering::Relaxed);
        let targets = *CONTROL_TARGETS.lock().await;

        let cmd = controller.step(pos, targets);

        PHASE_LEAD.store(cmd.lead, Ordering::Relaxed);
        TORQUE.store(cmd.torque_us, Ordering::Relaxed);

        if cmd.stalled() {
            state::request_jolt();
        }

        tick = tick.wrapping_add(1);
        if tick % REPORT_EVERY == 0 {
            event::send(StatusEvent::VelocityReport(cmd.velocity)).await;
            event::send(StatusEvent::PositionReport(pos)).await;
        }
    }
}
