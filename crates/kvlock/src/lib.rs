//! Distributed mutual-exclusion locks over shared key-value stores.
//!
//! This crate provides a client-side lock built from nothing but a store's
//! atomic create-if-absent operation. Any number of processes pointed at the
//! same store contend correctly; the store itself needs no lock-specific
//! server logic. Acquisition is a bounded poll loop, a TTL backstop cleans
//! up after crashed holders, and a two-phase variant lets a lock outlive the
//! call that acquired it until its owning transaction releases it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kvlock::*;
//! use std::time::Duration;
//!
//! struct ShipOrder;
//!
//! impl LockCallback<String> for ShipOrder {
//!     async fn on_acquired(&mut self) -> Result<String, BoxError> {
//!         // Exclusive access to the order while this runs.
//!         Ok("shipped".to_string())
//!     }
//!
//!     async fn on_not_acquired(&mut self) -> String {
//!         "another worker is shipping it".to_string()
//!     }
//!
//!     async fn on_error(&mut self, error: LockError) -> LockResult<String> {
//!         Err(error)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LockClient::new(MemoryLockStore::new());
//!
//!     // Wait up to 2s for the lock; a crashed holder's entry expires after 5s.
//!     let outcome = client
//!         .acquire(
//!             "order:1001",
//!             Duration::from_secs(2),
//!             Duration::from_secs(5),
//!             ShipOrder,
//!         )
//!         .await?;
//!
//!     println!("{}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! # Stores
//!
//! ## In-Process Store
//!
//! A shared map behind a mutex. No external services; clones share entries,
//! so it also works for single-process coordination and for tests.
//!
//! ```rust,no_run
//! use kvlock::MemoryLockStore;
//!
//! let store = MemoryLockStore::new();
//! ```
//!
//! ## Redis Store
//!
//! Backed by a single Redis server; create-if-absent maps to `SET NX` and
//! the TTL backstop to `EXPIREAT`.
//!
//! ```rust,no_run
//! use kvlock::RedisLockStore;
//!
//! # async fn connect() -> kvlock::LockResult<()> {
//! let store = RedisLockStore::new("redis://localhost:6379").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Two-Phase Locks
//!
//! [`LockClient::acquire_tcc`] tags the entry with an owner token derived
//! from a transaction id. A successful critical section leaves the lock held;
//! it stays held across calls and processes until [`LockClient::release_tcc`]
//! is invoked with the same transaction id, the TTL backstop fires, or a
//! contender reclaims the entry past its deadline. Release with a mismatched
//! or missing token is a silent no-op, so a late release can never delete a
//! lock that has since changed hands.
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `kvlock-core`: the client, store contract, callback, and in-process store
//! - `kvlock-redis`: the Redis store
//!
//! For fine-grained control, you can depend on individual crates instead.

// Re-export core types and traits
pub use kvlock_core::*;

// Re-export redis store
#[allow(ambiguous_glob_reexports)]
pub use kvlock_redis::*;
