//! Status events and inter-task queues
//!
//! Defines the outbound status-event mailbox consumed by the reporter task
//! and the inbound serial byte queue feeding the command decoder.
//!
//! Saturation policy: task-context producers `send(..).await` and block
//! until the reporter drains a slot; edge-adjacent code uses [`try_send`]
//! and drops the event instead of stalling the handler.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Multi-producer, single-consumer status mailbox with capacity of 16
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, StatusEvent, 16> = Channel::new();

/// Inbound serial bytes, UART reader to command decoder
pub static SERIAL_BYTES: Channel<CriticalSectionRawMutex, u8, 64> = Channel::new();

/// Sends a status event, blocking while the mailbox is full
pub async fn send(event: StatusEvent) {
    EVENT_CHANNEL.sender().send(event).await;
}

/// Sends a status event without blocking; a full mailbox drops it
pub fn try_send(event: StatusEvent) {
    let _ = EVENT_CHANNEL.sender().try_send(event);
}

/// Receives the next status event, waiting while the mailbox is empty
pub async fn wait() -> StatusEvent {
    EVENT_CHANNEL.receiver().receive().await
}

/// Everything the firmware reports over the status line
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum StatusEvent {
    /// Mining nonce whose hash met the difficulty mask
    NonceMatch(u64),
    /// Hash iterations completed in the last second
    ComputeRate(u32),
    /// Mining key command applied
    KeyAccepted(u64),
    /// Torque override command applied
    TorqueAccepted(i32),
    /// Velocity target command applied (rev/s)
    VelocityTargetAccepted(f32),
    /// Position target command applied (revolutions)
    PositionTargetAccepted(f32),
    /// Periodic measured velocity (steps/sec)
    VelocityReport(f32),
    /// Periodic position accumulator snapshot (steps)
    PositionReport(i32),
    /// Catch-all with a raw payload
    Other(u32),
}
