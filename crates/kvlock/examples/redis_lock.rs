//! Example: Distributed locking over Redis
//!
//! Run with: `cargo run --example redis_lock`
//!
//! Requires a Redis server. Set REDIS_URL environment variable
//! or modify the URL below.

use kvlock::*;
use std::time::Duration;

struct ShipOrder {
    order: String,
}

impl LockCallback<String> for ShipOrder {
    async fn on_acquired(&mut self) -> Result<String, BoxError> {
        println!("lock acquired, shipping order {}...", self.order);
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(format!("order {} shipped", self.order))
    }

    async fn on_not_acquired(&mut self) -> String {
        format!("order {} is being shipped by another worker", self.order)
    }

    async fn on_error(&mut self, error: LockError) -> LockResult<String> {
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

    // Get Redis URL from environment or use default
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

    println!("Connecting to Redis...");
    let store = RedisLockStore::new(&redis_url).await?;
    let client = LockClient::new(store);

    // Wait up to 2s for the lock; a crashed holder's entry expires after 10s.
    let outcome = client
        .acquire(
            "order:1001",
            Duration::from_secs(2),
            Duration::from_secs(10),
            ShipOrder {
                order: "1001".to_string(),
            },
        )
        .await?;

    println!("{}", outcome);

    Ok(())
}
