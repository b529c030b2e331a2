use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;

use crate::types::ItemType;

const SUFFIX_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

static SEQUENCE: OnceLock<AtomicU64> = OnceLock::new();

fn next_sequence() -> u64 {
    SEQUENCE
        .get_or_init(|| AtomicU64::new(Utc::now().timestamp_millis() as u64))
        .fetch_add(1, Ordering::Relaxed)
}

/// Generates a booking reference of the form `{PREFIX}-{6 digits}-{4 chars}`,
/// e.g. `VEH-583201-K7QD`.
///
/// The digit field comes from a process-wide counter seeded from the clock,
/// so any one million consecutive in-process generations are distinct even
/// before the random suffix is considered. The unique index on
/// `bookings.booking_reference` backstops collisions across processes.
pub fn generate_reference(item_type: ItemType) -> String {
    let sequence = next_sequence() % 1_000_000;

    let mut rng = rand::rng();
    let suffix: String = (0..4)
        .map(|_| SUFFIX_CHARS[rng.random_range(0..SUFFIX_CHARS.len())] as char)
        .collect();

    format!("{}-{:06}-{}", item_type.reference_prefix(), sequence, suffix)
}
