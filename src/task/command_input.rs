//! Command decoder task
//!
//! Consumes the serial byte queue, assembles carriage-return-terminated
//! lines and applies accepted commands to the shared setpoints. Every
//! accepted command also emits a status event carrying the parsed value;
//! rejected input disappears silently.

use core::sync::atomic::Ordering;

use defmt::info;

use crate::system::command::{Command, CommandLine};
use crate::system::control::clamp_torque;
use crate::system::event::{self, StatusEvent, SERIAL_BYTES};
use crate::system::state::{CONTROL_TARGETS, MINING_KEY, PHASE_LEAD, TORQUE};

#[embassy_executor::task]
pub async fn command_input() {
    info!("Command decoder started");

    let mut line = CommandLine::new();
    loop {
        let byte = SERIAL_BYTES.receive().await;
        let Some(command) = line.push(byte) else {
            continue;
        };

        match command {
            Command::Key(key) => {
                *MINING_KEY.lock().await = key;
                event::send(StatusEvent::KeyAccepted(key)).await;
            }
            Command::Torque(torque) => {
                // Manual override: sign picks the lead, magnitude is clamped
                // to the duty ceiling like any other torque producer
                PHASE_LEAD.store(if torque < 0 { -2 } else { 2 }, Ordering::Relaxed);
                TORQUE.store(clamp_torque(torque.unsigned_abs() as f32), Ordering::Relaxed);
                event::send(StatusEvent::TorqueAccepted(torque)).await;
            }
            Command::Velocity(velocity) => {
                CONTROL_TARGETS.lock().await.velocity = velocity;
                event::send(StatusEvent::VelocityTargetAccepted(velocity)).await;
            }
            Command::Position(position) => {
                CONTROL_TARGETS.lock().await.position = position;
                event::send(StatusEvent::PositionTargetAccepted(position)).await;
            }
        }
    }
}
