//! Example: Two-phase (TCC) locking over Redis
//!
//! Run with: `cargo run --example tcc_lock`
//!
//! Requires a Redis server. Set REDIS_URL environment variable
//! or modify the URL below.
//!
//! A two-phase lock outlives the call that acquires it: the try phase takes
//! the lock and leaves it held, and only `release_tcc` from the owning
//! transaction (or the TTL backstop) lets it go.

use kvlock::*;
use std::time::Duration;

struct Reserve;

impl LockCallback<bool> for Reserve {
    async fn on_acquired(&mut self) -> Result<bool, BoxError> {
        println!("try phase: inventory reserved");
        Ok(true)
    }

    async fn on_not_acquired(&mut self) -> bool {
        println!("try phase: resource busy, transaction must retry");
        false
    }

    async fn on_error(&mut self, error: LockError) -> LockResult<bool> {
        Err(error)
    }
}

struct Probe;

impl LockCallback<bool> for Probe {
    async fn on_acquired(&mut self) -> Result<bool, BoxError> {
        Ok(true)
    }

    async fn on_not_acquired(&mut self) -> bool {
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

    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

    println!("Connecting to Redis...");
    let store = RedisLockStore::new(&redis_url).await?;
    let client = LockClient::new(store);

    let key = "inventory:sku-7";
    let xid = "txn-42";

    let reserved = client
        .acquire_tcc(
            key,
            xid,
            Duration::from_secs(2),
            Duration::from_secs(30),
            Reserve,
        )
        .await?;
    if !reserved {
        return Ok(());
    }

    // The lock is still held even though the acquiring call has returned.
    let while_held = client
        .acquire_tcc(
            key,
            "txn-99",
            Duration::from_millis(300),
            Duration::from_secs(30),
            Probe,
        )
        .await?;
    println!("contender acquired while held: {}", while_held);

    // Confirm or cancel happens elsewhere in the transaction; either way it
    // ends with a release under the owning xid.
    client.release_tcc(key, xid).await?;
    println!("transaction {} released the lock", xid);

    let after_release = client
        .acquire_tcc(
            key,
            "txn-99",
            Duration::from_millis(300),
            Duration::from_secs(30),
            Probe,
        )
        .await?;
    println!("contender acquired after release: {}", after_release);

    // The probe now owns the lock; release its hold too.
    client.release_tcc(key, "txn-99").await?;

    Ok(())
}
