//! Shared criterion presets and reproducible workload generators.

use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::Measurement;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const SMALL_RUNTIME_SAMPLE_SIZE: usize = 15;
const SMALL_RUNTIME_WARM_UP_MS: u64 = 100;
const SMALL_RUNTIME_MEASURE_MS: u64 = 200;
const MEDIUM_RUNTIME_SAMPLE_SIZE: usize = 15;
const MEDIUM_RUNTIME_WARM_UP_MS: u64 = 500;
const MEDIUM_RUNTIME_MEASURE_MS: u64 = 1000;
const LARGE_RUNTIME_SAMPLE_SIZE: usize = 10;
const LARGE_RUNTIME_WARM_UP_MS: u64 = 800;
const LARGE_RUNTIME_MEASURE_MS: u64 = 1500;
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

pub fn apply_small_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(SMALL_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(SMALL_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(SMALL_RUNTIME_MEASURE_MS));
}

pub fn apply_medium_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(MEDIUM_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(MEDIUM_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(MEDIUM_RUNTIME_MEASURE_MS));
}

pub fn apply_large_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(LARGE_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(LARGE_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(LARGE_RUNTIME_MEASURE_MS));
}

/// Picks the preset matching the work one iteration does.
pub fn apply_runtime_config_for<M: Measurement>(group: &mut BenchmarkGroup<'_, M>, size: usize) {
    match size {
        0..=4_096 => apply_small_runtime_config(group),
        4_097..=65_536 => apply_medium_runtime_config(group),
        _ => apply_large_runtime_config(group),
    }
}

/// splitmix64 finalizer.
pub fn mix_seed(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for one `(workload, size)` cell of a benchmark matrix.
pub fn seed_base(workload_id: u64, size: u64) -> u64 {
    mix_seed(0x0DDB_A11A_2026_0000_u64 ^ (workload_id << 48) ^ size)
}

pub fn seed_for_iter(base: u64, iter: u64) -> u64 {
    mix_seed(base ^ iter.wrapping_mul(SEED_MIX))
}

/// `0..n` in ascending order: the worst case for unbalanced trees.
pub fn sequential_keys(n: usize) -> Vec<u64> {
    (0..n as u64).collect()
}

/// A permutation of `0..n`.
pub fn shuffled_keys(n: usize, seed: u64) -> Vec<u64> {
    let mut keys = sequential_keys(n);
    keys.shuffle(&mut StdRng::seed_from_u64(seed));
    keys
}

/// `n` pseudo-random keys, distinct with overwhelming probability.
pub fn random_keys(n: usize, seed: u64) -> Vec<u64> {
    (0..n as u64).map(|i| mix_seed(seed ^ i)).collect()
}

/// `n` keys drawn from `0..distinct`, so most of them repeat.
pub fn repeated_keys(n: usize, distinct: u64, seed: u64) -> Vec<u64> {
    (0..n as u64).map(|i| mix_seed(seed ^ i) % distinct.max(1)).collect()
}
