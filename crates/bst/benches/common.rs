use std::hint::black_box;
use std::time::{Duration, Instant};

use bench::{apply_runtime_config_for, seed_base, seed_for_iter};
use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, BenchmarkId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bst::{Balance, Tree};

const SIZES: [usize; 5] = [1_000, 4_000, 16_000, 64_000, 256_000];
const MIXED_OPS_PER_ITER: usize = 200;
const HIT_RATE_PERCENT: u32 = 80;

/// Key streams fed to the insert workloads.
#[derive(Clone, Copy)]
pub enum Keys {
    Sequential,
    Shuffled,
    Repeated,
}

impl Keys {
    fn id(self) -> u64 {
        self as u64
    }

    fn generate(self, size: usize, seed: u64) -> Vec<u64> {
        match self {
            Keys::Sequential => bench::sequential_keys(size),
            Keys::Shuffled => bench::shuffled_keys(size, seed),
            Keys::Repeated => bench::repeated_keys(size, (size / 16) as u64, seed),
        }
    }
}

#[derive(Clone, Copy)]
enum MixedOp {
    Insert(u64),
    Remove(u64),
    Contains(u64),
    Rank(u64),
    Select(usize),
}

/// Builds a tree of `size` keys from scratch per iteration; a size bucket
/// above `max_size` is skipped.
pub fn bench_build<B, M>(group: &mut BenchmarkGroup<'_, M>, label: &str, keys: Keys, max_size: usize)
where
    B: Balance<u64> + Default,
    M: Measurement<Value = Duration>,
{
    for &size in SIZES.iter().filter(|&&s| s <= max_size) {
        apply_runtime_config_for(group, size);
        let input = keys.generate(size, seed_base(keys.id(), size as u64));

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for _ in 0..iters {
                    let start = Instant::now();
                    let mut tree = Tree::<u64, B>::new();
                    for &k in &input {
                        tree.insert(black_box(k));
                    }
                    black_box(tree.len());
                    total += start.elapsed();
                    drop(tree);
                }
                total
            })
        });
    }
}

/// Random updates and queries against a prebuilt tree. Every insert is paired
/// with a later removal so the tree size stays put across iterations.
pub fn bench_mixed<B, M>(group: &mut BenchmarkGroup<'_, M>, label: &str)
where
    B: Balance<u64> + Default,
    M: Measurement<Value = Duration>,
{
    for &size in &SIZES {
        apply_runtime_config_for(group, size);
        let base_seed = seed_base(16, size as u64);
        let keys = bench::random_keys(size, base_seed);
        let mut tree: Tree<u64, B> = keys.iter().copied().collect();

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = StdRng::seed_from_u64(seed_for_iter(base_seed, iter));
                    let ops = generate_mixed_ops(&keys, &mut rng);
                    let start = Instant::now();
                    run_mixed_ops(&mut tree, &ops);
                    black_box(tree.len());
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

fn generate_mixed_ops(keys: &[u64], rng: &mut StdRng) -> Vec<MixedOp> {
    let mut ops = Vec::with_capacity(MIXED_OPS_PER_ITER);
    let mut pending = Vec::new();
    for _ in 0..MIXED_OPS_PER_ITER {
        let key = if rng.random_range(0..100) < HIT_RATE_PERCENT {
            keys[rng.random_range(0..keys.len())]
        } else {
            rng.random()
        };
        match rng.random_range(0..10) {
            0 => {
                pending.push(key);
                ops.push(MixedOp::Insert(key));
            }
            1 => match pending.pop() {
                Some(key) => ops.push(MixedOp::Remove(key)),
                None => ops.push(MixedOp::Contains(key)),
            },
            2..=5 => ops.push(MixedOp::Contains(key)),
            6..=7 => ops.push(MixedOp::Rank(key)),
            _ => ops.push(MixedOp::Select(rng.random_range(1..=keys.len()))),
        }
    }
    ops.extend(pending.into_iter().map(MixedOp::Remove));
    ops
}

fn run_mixed_ops<B: Balance<u64>>(tree: &mut Tree<u64, B>, ops: &[MixedOp]) {
    for &op in ops {
        match op {
            MixedOp::Insert(key) => tree.insert(key),
            MixedOp::Remove(key) => {
                black_box(tree.remove(&key));
            }
            MixedOp::Contains(key) => {
                black_box(tree.contains(&key));
            }
            MixedOp::Rank(key) => {
                black_box(tree.rank(&key));
            }
            MixedOp::Select(k) => {
                black_box(tree.select(k).ok());
            }
        }
    }
}
