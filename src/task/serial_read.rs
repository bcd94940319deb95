//! UART receive pump
//!
//! Owns the UART RX half and forwards every byte into the bounded serial
//! queue consumed by the command decoder.

use defmt::{info, warn};
use embassy_rp::uart::{Async, UartRx};

use crate::system::event::SERIAL_BYTES;

#[embassy_executor::task]
pub async fn serial_read(mut rx: UartRx<'static, Async>) {
    info!("Serial reader started");

    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => SERIAL_BYTES.send(byte[0]).await,
            Err(e) => warn!("uart read error: {}", e),
        }
    }
}
