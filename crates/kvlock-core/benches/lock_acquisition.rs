//! Benchmarks for lock acquisition latency

use criterion::{criterion_group, criterion_main, Criterion};
use kvlock_core::prelude::*;
use std::time::Duration;

struct Noop;

impl LockCallback<()> for Noop {
    async fn on_acquired(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    async fn on_not_acquired(&mut self) {}

    async fn on_error(&mut self, error: LockError) -> LockResult<()> {
        Err(error)
    }
}

fn bench_memory_lock(c: &mut Criterion) {
    let client = LockClient::new(MemoryLockStore::new());

    let mut group = c.benchmark_group("memory_lock");
    group.bench_function("acquire_uncontended", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap())
            .iter(|| async {
                client
                    .acquire(
                        "bench-lock",
                        Duration::from_millis(100),
                        Duration::from_secs(5),
                        Noop,
                    )
                    .await
                    .unwrap();
            });
    });

    group.bench_function("tcc_acquire_release", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap())
            .iter(|| async {
                client
                    .acquire_tcc(
                        "bench-tcc",
                        "bench-xid",
                        Duration::from_millis(100),
                        Duration::from_secs(5),
                        Noop,
                    )
                    .await
                    .unwrap();
                client.release_tcc("bench-tcc", "bench-xid").await.unwrap();
            });
    });

    group.finish();
}

criterion_group!(benches, bench_memory_lock);
criterion_main!(benches);
