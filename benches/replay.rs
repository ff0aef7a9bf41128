//! Replay benchmarks: throughput of the evaluation engine per policy.
//!
//! Run with: `cargo bench --bench replay`
//!
//! Every policy replays the same pre-generated traces, so the numbers compare
//! policy bookkeeping cost rather than key generation. A final group measures
//! a whole comparison plan, sequential against parallel.

use std::hint::black_box;
use std::time::{Duration, Instant};

use cacheeval::builder::{CacheBuilder, CachePolicy, KeyKind};
use cacheeval::comparison::ComparisonPlan;
use cacheeval::replay::replay;
use cacheeval::trace::{Trace, TraceGenerator, TracePattern};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

const CAPACITY: usize = 4096;
const UNIVERSE: u64 = 16_384;
const OPS: usize = 200_000;
const SEED: u64 = 42;

// ============================================================================
// Trace definitions
// ============================================================================

fn traces() -> Vec<Trace> {
    let patterns = [
        ("uniform", TracePattern::Uniform),
        (
            "hotset_90_10",
            TracePattern::Hotset {
                hot_fraction: 0.1,
                hot_prob: 0.9,
            },
        ),
        ("zipfian_1.0", TracePattern::Zipfian { exponent: 1.0 }),
        ("loop", TracePattern::Loop),
    ];
    patterns
        .into_iter()
        .map(|(name, pattern)| {
            TraceGenerator::new(pattern)
                .name(name)
                .universe(UNIVERSE)
                .length(OPS)
                .seed(SEED)
                .generate()
        })
        .collect()
}

// ============================================================================
// Replay throughput
// ============================================================================

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    group.throughput(Throughput::Elements(OPS as u64));

    for trace in traces() {
        for policy in CachePolicy::all(SEED) {
            for kind in [KeyKind::Generic, KeyKind::Integer] {
                let id = format!("{}/{:?}", policy.name(), kind);
                group.bench_with_input(
                    BenchmarkId::new(id, trace.name()),
                    &trace,
                    |b, trace| {
                        b.iter_custom(|iters| {
                            let mut total = Duration::default();
                            for _ in 0..iters {
                                let mut cache = CacheBuilder::new(CAPACITY)
                                    .policy(policy)
                                    .build_for::<u64>(kind);
                                let start = Instant::now();
                                black_box(replay(&mut cache, trace));
                                total += start.elapsed();
                                cache.close();
                            }
                            total
                        });
                    },
                );
            }
        }
    }

    group.finish();
}

// ============================================================================
// Hit rate report
// ============================================================================

/// Prints the hit rate table once; criterion measures the plan run.
fn bench_comparison_plan(c: &mut Criterion) {
    let plan = ComparisonPlan::builder()
        .policies(CachePolicy::all(SEED))
        .capacities([CAPACITY / 4, CAPACITY])
        .key_kind(KeyKind::Integer);
    let plan = traces()
        .into_iter()
        .fold(plan, |plan, trace| plan.trace(trace))
        .build();

    if let Ok(results) = plan.run() {
        println!("\n=== Hit rates (capacity x policy x trace) ===");
        for result in &results {
            println!("{}", result);
        }
    }

    let threads = std::thread::available_parallelism().map_or(1, |n| n.get());
    let mut group = c.benchmark_group("comparison_plan");
    group.sample_size(10);
    group.bench_function("sequential", |b| b.iter(|| black_box(plan.run())));
    group.bench_function(BenchmarkId::new("parallel", threads), |b| {
        b.iter(|| black_box(plan.run_parallel(threads)))
    });
    group.finish();
}

criterion_group!(benches, bench_replay, bench_comparison_plan);
criterion_main!(benches);
