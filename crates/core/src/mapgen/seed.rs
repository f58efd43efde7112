//! Seed resolution and the small random helpers the generator draws from.

use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand_chacha::{ChaCha8Rng, rand_core::Rng};

static GENERATED_SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A fresh, never-zero seed from wall clock, process id and a per-process counter.
pub fn generate_runtime_seed() -> u64 {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(process::id());
    let counter = GENERATED_SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let entropy = (now_nanos as u64)
        ^ ((now_nanos >> 64) as u64)
        ^ pid.rotate_left(17)
        ^ counter.rotate_left(7);

    match mix_seed(entropy) {
        0 => 0x9E37_79B9_7F4A_7C15,
        seed => seed,
    }
}

/// Seed 0 means "pick one"; anything else is used as given.
pub fn resolve_seed(requested: u64) -> u64 {
    if requested == 0 { generate_runtime_seed() } else { requested }
}

pub(super) fn mix_seed(mut value: u64) -> u64 {
    value ^= value >> 30;
    value = value.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    value ^= value >> 27;
    value = value.wrapping_mul(0x94D0_49BB_1331_11EB);
    value ^ (value >> 31)
}

/// Uniform-ish integer in `min_value..=max_value`.
pub(super) fn random_i32(rng: &mut ChaCha8Rng, min_value: i32, max_value: i32) -> i32 {
    debug_assert!(min_value <= max_value);
    let range_size = (i64::from(max_value) - i64::from(min_value) + 1) as u64;
    (i64::from(min_value) + (rng.next_u64() % range_size) as i64) as i32
}

pub(super) fn random_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    debug_assert!(len > 0);
    (rng.next_u64() % len as u64) as usize
}

/// Uniform float in `[0, 1)`.
pub(super) fn random_unit(rng: &mut ChaCha8Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1_u64 << 53) as f64
}

pub(super) fn shuffle<T>(rng: &mut ChaCha8Rng, items: &mut [T]) {
    for idx in (1..items.len()).rev() {
        let swap_with = random_index(rng, idx + 1);
        items.swap(idx, swap_with);
    }
}
