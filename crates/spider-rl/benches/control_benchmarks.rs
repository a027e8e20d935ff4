//! Control-path benchmarks
//!
//! Both functions run once per control tick:
//! - `decide` on every inference tick
//! - `compute_reward` on every training step
//!
//! ## Performance Targets
//! - Routing decision: < 100ns
//! - TARGET_MODE reward: < 200ns
//! - NO_TARGET_MODE reward with a 64-entry history: < 2µs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use spider_core::{Observation, PolicyKind, RewardMode};
use spider_rl::{
    compute_reward, decide, no_target_reward, PolicyRouter, PreZQueue, RewardConfig,
    RouterThresholds,
};

fn bench_router(c: &mut Criterion) {
    let mut group = c.benchmark_group("router");
    let thresholds = RouterThresholds::default();

    group.bench_function("decide", |b| {
        b.iter(|| decide(black_box(37.5), black_box(PolicyKind::Redirect), &thresholds))
    });

    let mut rng = StdRng::seed_from_u64(42);
    for len in [16usize, 256, 4096] {
        let angles: Vec<f64> = (0..len).map(|_| rng.gen_range(-90.0..90.0)).collect();
        let router = PolicyRouter::default();

        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("replay", len), &angles, |b, angles| {
            b.iter(|| router.replay(black_box(angles), PolicyKind::Forward))
        });
    }

    group.finish();
}

fn bench_reward(c: &mut Criterion) {
    let mut group = c.benchmark_group("reward");

    let target = RewardConfig::default();
    let obs = Observation::new(3.0, 42.0, -12.0);
    let mut queue = PreZQueue::filled(1, 0.0);

    group.bench_function("target_mode", |b| {
        b.iter(|| compute_reward(black_box(&obs), &mut queue, black_box(128), &target))
    });

    for k in [1usize, 8, 64] {
        let config = RewardConfig {
            reward_mode: RewardMode::NoTargetMode,
            pre_z_queue_size: k,
            ..RewardConfig::default()
        };
        let mut history = PreZQueue::new(k);
        for i in 0..k {
            history.push(i as f64 * 0.1);
        }

        group.bench_with_input(BenchmarkId::new("no_target_mode", k), &config, |b, config| {
            b.iter(|| no_target_reward(black_box(0.2), black_box(10.0), &mut history, config))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_router, bench_reward);
criterion_main!(benches);
