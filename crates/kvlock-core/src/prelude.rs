//! Convenience prelude for the lock client and its traits.

pub use crate::cadence::RetryCadence;
pub use crate::client::LockClient;
pub use crate::entry::{LOCK_NAMESPACE, XID_LOCK_NAMESPACE};
pub use crate::error::{BoxError, LockError, LockResult};
pub use crate::memory::MemoryLockStore;
pub use crate::traits::{LockCallback, LockStore};
