//! Redis backend for kvlock.

pub mod store;

pub use store::{RedisLockStore, RedisLockStoreBuilder};
