//! In-process implementation of the store contract.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::LockResult;
use crate::traits::LockStore;

#[derive(Debug)]
struct MemoryEntry {
    value: String,
    expire_at_secs: Option<i64>,
}

impl MemoryEntry {
    fn is_expired_at(&self, now_secs: i64) -> bool {
        self.expire_at_secs.is_some_and(|at| now_secs >= at)
    }
}

/// A [`LockStore`] backed by a shared in-process map.
///
/// Useful for tests, benches, and single-process coordination. Clones share
/// the same map, so clients built over clones contend for the same entries.
/// `expire_at` behaves the way a real store behaves: an entry whose backstop
/// instant has passed is invisible to `get` and replaceable by
/// `set_if_absent`.
#[derive(Debug, Clone, Default)]
pub struct MemoryLockStore {
    entries: Arc<Mutex<HashMap<(String, String), MemoryEntry>>>,
}

impl MemoryLockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<(String, String), MemoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

impl LockStore for MemoryLockStore {
    async fn set_if_absent(&self, namespace: &str, key: &str, value: &str) -> LockResult<bool> {
        let now = now_secs();
        let mut entries = self.entries();
        let slot = (namespace.to_string(), key.to_string());
        match entries.get(&slot) {
            Some(existing) if !existing.is_expired_at(now) => Ok(false),
            _ => {
                entries.insert(
                    slot,
                    MemoryEntry {
                        value: value.to_string(),
                        expire_at_secs: None,
                    },
                );
                Ok(true)
            }
        }
    }

    async fn expire_at(&self, namespace: &str, key: &str, at_epoch_secs: i64) -> LockResult<()> {
        let now = now_secs();
        let mut entries = self.entries();
        let slot = (namespace.to_string(), key.to_string());
        if let Some(entry) = entries.get_mut(&slot) {
            if entry.is_expired_at(now) {
                entries.remove(&slot);
            } else {
                entry.expire_at_secs = Some(at_epoch_secs);
            }
        }
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> LockResult<Option<String>> {
        let now = now_secs();
        let entries = self.entries();
        let slot = (namespace.to_string(), key.to_string());
        Ok(entries
            .get(&slot)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone()))
    }

    async fn delete(&self, namespace: &str, key: &str) -> LockResult<()> {
        let mut entries = self.entries();
        entries.remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }
}
