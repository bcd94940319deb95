//! Background hash-mining workload
//!
//! Independent compute loop sharing nothing with motor control except the
//! lock-guarded key and the status mailbox. Each iteration hashes the
//! current key with an advancing nonce; a digest clearing the difficulty
//! mask reports the nonce, and the iteration count is reported once per
//! second. Yields to the executor in batches so the motor tasks stay
//! responsive.

use defmt::info;
use embassy_futures::yield_now;
use embassy_time::{Duration, Instant};

use crate::system::event::{self, StatusEvent};
use crate::system::state::MINING_KEY;

/// A digest counts as a match when these low bits are all zero
const DIFFICULTY_MASK: u64 = 0xFFFF;

/// Hash iterations between executor yields
const YIELD_BATCH: u32 = 256;

/// Rate report interval
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// One opaque 64-bit hash step (splitmix-style avalanche)
fn hash_step(key: u64, nonce: u64) -> u64 {
    let mut x = key ^ nonce.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

#[embassy_executor::task]
pub async fn mine() {
    info!("Mining workload started");

    let mut nonce: u64 = 0;
    let mut iterations: u32 = 0;
    let mut window_start = Instant::now();

    loop {
        // Lock held only for the single key read
        let key = *MINING_KEY.lock().await;

        if hash_step(key, nonce) & DIFFICULTY_MASK == 0 {
            event::send(StatusEvent::NonceMatch(nonce)).await;
        }

        nonce = nonce.wrapping_add(1);
        iterations += 1;

        if iterations % YIELD_BATCH == 0 {
            yield_now().await;
        }

        if window_start.elapsed() >= REPORT_INTERVAL {
            event::send(StatusEvent::ComputeRate(iterations)).await;
            iterations = 0;
            window_start = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_step_is_deterministic_and_key_sensitive() {
        assert_eq!(hash_step(1, 42), hash_step(1, 42));
        assert_ne!(hash_step(1, 42), hash_step(2, 42));
        assert_ne!(hash_step(1, 42), hash_step(1, 43));
    }
}
