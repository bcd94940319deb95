//! Motor drive firmware entry point
//!
//! Prints the boot banner, aligns the rotor to find the origin offset, then
//! spawns the commutation, control, serial and mining tasks.

#![no_std]
#![no_main]

use crate::system::commutation::{decode_rotor, INVALID_ROTOR_STATE};
use crate::system::motor::Commutator;
use crate::system::resources::{
    AssignedResources, HallSensorResources, Irqs, PhaseBridgeResources, SerialResources,
};
use crate::task::{
    command_input::command_input,
    commutate::{commutate, sensor_bits, RpPhaseBridge},
    control_loop::control_loop,
    mine::mine,
    serial_read::serial_read,
    status_report::status_report,
};
use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::uart::{self, Uart};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// Time the rotor is held at drive state 0 before reading the origin
const ALIGN_SETTLE_SECS: u64 = 2;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    // Serial link up first so the banner precedes everything else
    let uart = Uart::new(
        r.serial.uart,
        r.serial.tx_pin,
        r.serial.rx_pin,
        Irqs,
        r.serial.tx_dma,
        r.serial.rx_dma,
        uart::Config::default(),
    );
    let (mut tx, rx) = uart.split();
    tx.blocking_write(b"hall-drive 0.1.0\r\n").unwrap();
    info!("hall-drive starting");

    // Photo-interrupter inputs
    let i1 = Input::new(r.hall_sensors.i1_pin, Pull::Up);
    let i2 = Input::new(r.hall_sensors.i2_pin, Pull::Up);
    let i3 = Input::new(r.hall_sensors.i3_pin, Pull::Up);

    let mut commutator = Commutator::new(RpPhaseBridge::new(r.phase_bridge));

    // Alignment: hold drive state 0, wait for mechanical rest, then read
    // back the rotor state. That reading is the origin offset every later
    // drive-state computation subtracts.
    commutator.hold_alignment();
    Timer::after_secs(ALIGN_SETTLE_SECS).await;
    let origin = match decode_rotor(sensor_bits(&i1, &i2, &i3)) {
        INVALID_ROTOR_STATE => {
            warn!("alignment read invalid sensor state, assuming origin 0");
            0
        }
        state => state,
    };
    info!("Rotor origin: {}", origin);

    // Spawn the edge handler first so no commutation edge is missed once
    // the control loop starts publishing setpoints
    spawner.spawn(commutate(commutator, i1, i2, i3, origin)).unwrap();
    spawner.spawn(control_loop()).unwrap();
    spawner.spawn(serial_read(rx)).unwrap();
    spawner.spawn(command_input()).unwrap();
    spawner.spawn(status_report(tx)).unwrap();
    spawner.spawn(mine()).unwrap();
}
