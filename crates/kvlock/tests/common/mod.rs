//! Shared test doubles: instrumented stores and canned callbacks.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use kvlock::*;

/// Wall clock offset helper for building entry deadlines in tests.
pub fn millis_from_now(offset_millis: i64) -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
        + offset_millis
}

/// Store wrapper that counts `set_if_absent` attempts.
#[derive(Clone)]
pub struct CountingStore {
    inner: MemoryLockStore,
    attempts: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new(inner: MemoryLockStore) -> Self {
        Self {
            inner,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl LockStore for CountingStore {
    async fn set_if_absent(&self, namespace: &str, key: &str, value: &str) -> LockResult<bool> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.inner.set_if_absent(namespace, key, value).await
    }

    async fn expire_at(&self, namespace: &str, key: &str, at_epoch_secs: i64) -> LockResult<()> {
        self.inner.expire_at(namespace, key, at_epoch_secs).await
    }

    async fn get(&self, namespace: &str, key: &str) -> LockResult<Option<String>> {
        self.inner.get(namespace, key).await
    }

    async fn delete(&self, namespace: &str, key: &str) -> LockResult<()> {
        self.inner.delete(namespace, key).await
    }
}

/// Store wrapper that fails selected operations with an injected error.
#[derive(Clone)]
pub struct FaultStore {
    inner: MemoryLockStore,
    fail_expire_at: bool,
    fail_delete: bool,
}

impl FaultStore {
    pub fn failing_expire_at(inner: MemoryLockStore) -> Self {
        Self {
            inner,
            fail_expire_at: true,
            fail_delete: false,
        }
    }

    pub fn failing_delete(inner: MemoryLockStore) -> Self {
        Self {
            inner,
            fail_expire_at: false,
            fail_delete: true,
        }
    }

    fn injected() -> LockError {
        LockError::Store(Box::new(std::io::Error::other("injected store failure")))
    }
}

impl LockStore for FaultStore {
    async fn set_if_absent(&self, namespace: &str, key: &str, value: &str) -> LockResult<bool> {
        self.inner.set_if_absent(namespace, key, value).await
    }

    async fn expire_at(&self, namespace: &str, key: &str, at_epoch_secs: i64) -> LockResult<()> {
        if self.fail_expire_at {
            return Err(Self::injected());
        }
        self.inner.expire_at(namespace, key, at_epoch_secs).await
    }

    async fn get(&self, namespace: &str, key: &str) -> LockResult<Option<String>> {
        self.inner.get(namespace, key).await
    }

    async fn delete(&self, namespace: &str, key: &str) -> LockResult<()> {
        if self.fail_delete {
            return Err(Self::injected());
        }
        self.inner.delete(namespace, key).await
    }
}

/// Shared counters recording which callback arms ran.
#[derive(Clone, Default)]
pub struct Outcomes {
    pub acquired: Arc<AtomicUsize>,
    pub not_acquired: Arc<AtomicUsize>,
    pub errored: Arc<AtomicUsize>,
}

impl Outcomes {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Callback whose critical section succeeds, optionally holding the lock
/// for a while first.
pub struct Recording {
    outcomes: Outcomes,
    hold: Duration,
}

impl Recording {
    pub fn new(outcomes: &Outcomes) -> Self {
        Self {
            outcomes: outcomes.clone(),
            hold: Duration::ZERO,
        }
    }

    pub fn holding(outcomes: &Outcomes, hold: Duration) -> Self {
        Self {
            outcomes: outcomes.clone(),
            hold,
        }
    }
}

impl LockCallback<String> for Recording {
    async fn on_acquired(&mut self) -> Result<String, BoxError> {
        self.outcomes.acquired.fetch_add(1, Ordering::SeqCst);
        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }
        Ok("acquired".to_string())
    }

    async fn on_not_acquired(&mut self) -> String {
        self.outcomes.not_acquired.fetch_add(1, Ordering::SeqCst);
        "not-acquired".to_string()
    }

    async fn on_error(&mut self, error: LockError) -> LockResult<String> {
        self.outcomes.errored.fetch_add(1, Ordering::SeqCst);
        Err(error)
    }
}

/// Callback whose critical section fails; `on_error` either propagates or
/// recovers with a fallback value.
pub struct FailSection {
    outcomes: Outcomes,
    recover: bool,
}

impl FailSection {
    pub fn new(outcomes: &Outcomes) -> Self {
        Self {
            outcomes: outcomes.clone(),
            recover: false,
        }
    }

    pub fn recovering(outcomes: &Outcomes) -> Self {
        Self {
            outcomes: outcomes.clone(),
            recover: true,
        }
    }
}

impl LockCallback<String> for FailSection {
    async fn on_acquired(&mut self) -> Result<String, BoxError> {
        self.outcomes.acquired.fetch_add(1, Ordering::SeqCst);
        Err("section failed".into())
    }

    async fn on_not_acquired(&mut self) -> String {
        self.outcomes.not_acquired.fetch_add(1, Ordering::SeqCst);
        "not-acquired".to_string()
    }

    async fn on_error(&mut self, error: LockError) -> LockResult<String> {
        self.outcomes.errored.fetch_add(1, Ordering::SeqCst);
        if self.recover {
            Ok("recovered".to_string())
        } else {
            Err(error)
        }
    }
}

/// Callback whose critical section panics.
pub struct PanicSection;

impl LockCallback<String> for PanicSection {
    async fn on_acquired(&mut self) -> Result<String, BoxError> {
        panic!("critical section panicked");
    }

    async fn on_not_acquired(&mut self) -> String {
        "not-acquired".to_string()
    }

    async fn on_error(&mut self, _error: LockError) -> LockResult<String> {
        panic!("on_error must not run for a panicking section");
    }
}
