//! Benchmarks bulk generation into an undersized pool, and a save/load cycle
//! of a pool with a mix of free and bound numbers.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use phonepool::{storage, OwnerId, ResourcePool};
use tempfile::TempDir;

fn generate(c: &mut Criterion) {
    c.bench_function("generate 100k from a 6 digit segment", |b| {
        b.iter_batched(
            || ResourcePool::new(1),
            |mut pool| pool.generate("138000", 100_000).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

/// A pool of 50k numbers with every fiftieth one bound.
fn preseed_pool() -> ResourcePool {
    let mut pool = ResourcePool::new(50_000).with_owner_limit(usize::MAX);
    pool.generate("1391", 50_000).unwrap();
    let owner = OwnerId::new(7).unwrap();
    let numbers: Vec<_> = pool
        .records()
        .step_by(50)
        .map(|r| r.number().clone())
        .collect();
    for number in &numbers {
        pool.bind(owner, number).unwrap();
    }
    pool
}

fn save_and_load(c: &mut Criterion) {
    let pool = preseed_pool();

    c.bench_function("save and load 50k records", |b| {
        b.iter_batched(
            || TempDir::new().unwrap(),
            |tmp_dir| {
                let path = tmp_dir.path().join("phones.dat");
                storage::save(&pool, &path).unwrap();
                let mut restored = ResourcePool::default();
                storage::load(&mut restored, &path).unwrap();
                restored
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, generate, save_and_load);
criterion_main!(benches);
