//! Example: In-process locking with the memory store
//!
//! Run with: `cargo run --example memory_lock`
//!
//! Spawns a handful of workers that contend for the same key. Exactly one
//! wins each round; the rest exhaust their wait budget and report
//! not-acquired.

use kvlock::*;
use std::time::Duration;

struct CountedWork {
    worker: usize,
}

impl LockCallback<bool> for CountedWork {
    async fn on_acquired(&mut self) -> Result<bool, BoxError> {
        println!("worker {} acquired the lock, doing work...", self.worker);
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(true)
    }

    async fn on_not_acquired(&mut self) -> bool {
        println!("worker {} did not get the lock", self.worker);
        false
    }

    async fn on_error(&mut self, error: LockError) -> LockResult<bool> {
        Err(error)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let client = LockClient::new(MemoryLockStore::new());

    let mut handles = Vec::new();
    for worker in 0..4 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .acquire_with_cadence(
                    "shared-counter",
                    RetryCadence::VeryQuick,
                    Duration::from_millis(100),
                    Duration::from_secs(5),
                    CountedWork { worker },
                )
                .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await?? {
            winners += 1;
        }
    }
    println!("{} of 4 workers won the lock", winners);

    Ok(())
}
