//! Shared setpoints and accumulators
//!
//! Scalars crossing the edge-handler/task boundary are plain atomics (the
//! RP2350 has native word atomics, so each access is a single interrupt-safe
//! load or store). State shared only between tasks sits behind an
//! embassy-sync mutex held just long enough for the one read or write.
//!
//! All of this is process-lifetime state: initialized here with safe
//! defaults and never destroyed.

use core::sync::atomic::{AtomicI32, AtomicI8, AtomicU16};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::system::control::Targets;
use crate::system::motor::MAX_TORQUE_US;

/// Phase lead consumed by the edge handler: +2 forward, -2 reverse.
/// Written only by the control task.
pub static PHASE_LEAD: AtomicI8 = AtomicI8::new(2);

/// Torque setpoint (low-side pulse width, microseconds).
///
/// Producers clamp to `MAX_TORQUE_US` before storing; the edge handler
/// applies the value as-is. Starts at the safe ceiling so the alignment
/// hold carries over until the first control tick.
pub static TORQUE: AtomicU16 = AtomicU16::new(MAX_TORQUE_US);

/// Position accumulator in commutation steps, 6 per electrical revolution.
/// Written only by the edge handler; the control task snapshots it exactly
/// once per tick.
pub static POSITION: AtomicI32 = AtomicI32::new(0);

/// Mining key, shared between the command decoder (writes) and the mining
/// task (reads). The lock is never held across an await.
pub static MINING_KEY: Mutex<CriticalSectionRawMutex, u64> = Mutex::new(0);

/// Control targets written by the command decoder, snapshot once per
/// control tick. Benign zero defaults: hold position zero.
pub static CONTROL_TARGETS: Mutex<CriticalSectionRawMutex, Targets> = Mutex::new(Targets {
    velocity: 0.0,
    position: 0.0,
});

/// Stall-break nudge from the control task to the edge handler.
///
/// Signaled when measured velocity is exactly zero; the edge handler then
/// runs one commutation step outside its normal edge cadence.
pub static STALL_JOLT: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Requests one out-of-cadence commutation step
pub fn request_jolt() {
    STALL_JOLT.signal(());
}
