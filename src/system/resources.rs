//! Hardware Resource Management
//!
//! Manages and allocates hardware resources (pins, peripherals) to different
//! system components:
//! - Hall sensors: three photo-interrupter lines, one edge interrupt each
//! - Phase bridge: three high-side outputs and three low-side PWM slices
//! - Serial: UART0 for the command line in and status lines out

use assign_resources::assign_resources;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, UART0};
use embassy_rp::uart::InterruptHandler as UartInterruptHandler;
use embassy_rp::Peri;

assign_resources! {
    /// Photo-interrupter rotor position sensors (I1, I2, I3)
    hall_sensors: HallSensorResources {
        i1_pin: PIN_10,
        i2_pin: PIN_11,
        i3_pin: PIN_12,
    },
    /// Three-phase bridge: high sides as plain outputs, low sides PWM
    phase_bridge: PhaseBridgeResources {
        l1_high_pin: PIN_2,
        l2_high_pin: PIN_4,
        l3_high_pin: PIN_6,
        l1_low_slice: PWM_SLICE1,
        l1_low_pin: PIN_3,
        l2_low_slice: PWM_SLICE2,
        l2_low_pin: PIN_5,
        l3_low_slice: PWM_SLICE3,
        l3_low_pin: PIN_7,
    },
    /// Operator serial link
    serial: SerialResources {
        uart: UART0,
        tx_pin: PIN_0,
        rx_pin: PIN_1,
        tx_dma: DMA_CH0,
        rx_dma: DMA_CH1,
    },
}

bind_interrupts!(pub struct Irqs {
    UART0_IRQ => UartInterruptHandler<UART0>;
});
