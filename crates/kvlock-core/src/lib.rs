//! Core client, traits, and types for key-value-store-backed locks.

pub mod cadence;
pub mod client;
pub mod entry;
pub mod error;
pub mod memory;
pub mod prelude;
pub mod traits;

pub use error::{LockError, LockResult};
pub use prelude::*;
