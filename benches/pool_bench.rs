use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use worker_pools::{Context, WorkerPool};

const ITEMS: usize = 1000;

fn capacity_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("capacity");
    let mut rng = StdRng::seed_from_u64(42);
    let items: Vec<u64> = (0..ITEMS).map(|_| rng.gen_range(0..1000)).collect();

    for capacity in [0u64, 1, 200, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            b.iter(|| {
                let sum = Arc::new(AtomicU64::new(0));
                let total = sum.clone();
                let pool = WorkerPool::builder(move |_: &Context, n: u64| {
                    total.fetch_add(n, Ordering::Relaxed);
                })
                .pool_size(num_cpus::get())
                .unwrap()
                .queue_capacity(capacity)
                .unwrap()
                .build()
                .start(&Context::background())
                .unwrap();

                for &n in &items {
                    pool.submit(n).unwrap();
                }
                pool.stop().unwrap();
                sum.load(Ordering::Relaxed)
            });
        });
    }

    group.finish();
}

fn pool_size_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_size");

    for size in [1usize, 4, 25, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let pool = WorkerPool::builder(|_: &Context, n: usize| {
                    std::hint::black_box(n.wrapping_mul(31));
                })
                .pool_size(size)
                .unwrap()
                .build()
                .start(&Context::background())
                .unwrap();

                for n in 0..ITEMS {
                    pool.submit(n).unwrap();
                }
                pool.stop().unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, capacity_bench, pool_size_bench);
criterion_main!(benches);
