//! Status reporter task
//!
//! Sole consumer of the status mailbox. Renders one human-readable line per
//! event and writes it over the UART TX half it owns. The mailbox is the
//! only buffering; this task never pushes back on producers beyond that.

use core::fmt::Write;

use defmt::{info, warn};
use embassy_rp::uart::{Async, UartTx};
use heapless::String;

use crate::system::commutation::STEPS_PER_REV;
use crate::system::event::{self, StatusEvent};

#[embassy_executor::task]
pub async fn status_report(mut tx: UartTx<'static, Async>) {
    info!("Status reporter started");

    let mut line: String<64> = String::new();
    loop {
        let status = event::wait().await;

        line.clear();
        render(&mut line, status);
        line.push_str("\r\n").ok();

        if tx.write(line.as_bytes()).await.is_err() {
            warn!("uart write error, dropping status line");
        }
    }
}

/// Formats one event; velocity and position scale down to revolutions
fn render(line: &mut String<64>, status: StatusEvent) {
    let steps = STEPS_PER_REV as f32;
    match status {
        StatusEvent::NonceMatch(nonce) => write!(line, "Nonce: 0x{:016X}", nonce),
        StatusEvent::ComputeRate(rate) => write!(line, "Comp. rate: {} hash/s", rate),
        StatusEvent::KeyAccepted(key) => write!(line, "Key: 0x{:X}", key),
        StatusEvent::TorqueAccepted(torque) => write!(line, "Torque: {}", torque),
        StatusEvent::VelocityTargetAccepted(v) => write!(line, "Target velocity: {} rev/s", v),
        StatusEvent::PositionTargetAccepted(p) => write!(line, "Target rotation: {} rev", p),
        StatusEvent::VelocityReport(v) => write!(line, "Velocity: {} rev/s", v / steps),
        StatusEvent::PositionReport(p) => write!(line, "Position: {} rev", p as f32 / steps),
        StatusEvent::Other(payload) => write!(line, "Status: {}", payload),
    }
    .ok();
}
