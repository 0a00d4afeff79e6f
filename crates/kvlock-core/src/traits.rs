//! Core traits: the store contract and the outcome callback.

use std::future::Future;

use crate::error::{BoxError, LockError, LockResult};

// ============================================================================
// Store Contract
// ============================================================================

/// Atomic key-value operations a backing store must provide.
///
/// The lock client is a stateless orchestrator; all shared mutable state is
/// the lock entry itself, and every mutation goes through these four
/// single-key operations. Any store satisfying this contract is
/// substitutable: mutual exclusion is derived entirely from the atomicity
/// of [`set_if_absent`](LockStore::set_if_absent), never from client-side
/// synchronization.
///
/// All operations are scoped to a single logical key space and must be safe
/// under arbitrary concurrent callers.
///
/// # Example
///
/// ```rust,ignore
/// // Backed by Redis:
/// let store = RedisLockStore::new("redis://localhost:6379").await?;
/// let client = LockClient::new(store);
/// ```
pub trait LockStore: Send + Sync {
    /// Creates the entry iff it does not already exist.
    ///
    /// Returns `true` when this call created the entry, `false` when the
    /// entry was already present. This is the only operation that decides
    /// lock ownership, so it must be atomic.
    fn set_if_absent(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> impl Future<Output = LockResult<bool>> + Send;

    /// Schedules store-side removal of the entry at an absolute instant
    /// (seconds since the Unix epoch).
    ///
    /// A best-effort backstop: the store garbage-collects an abandoned entry
    /// even if no contender ever polls it again.
    fn expire_at(
        &self,
        namespace: &str,
        key: &str,
        at_epoch_secs: i64,
    ) -> impl Future<Output = LockResult<()>> + Send;

    /// Returns the entry's current value, or `None` when absent.
    fn get(
        &self,
        namespace: &str,
        key: &str,
    ) -> impl Future<Output = LockResult<Option<String>>> + Send;

    /// Removes the entry. Idempotent; removing an absent entry succeeds.
    fn delete(&self, namespace: &str, key: &str) -> impl Future<Output = LockResult<()>> + Send;
}

// ============================================================================
// Outcome Callback
// ============================================================================

/// Three-case handler driven by an acquisition call.
///
/// Exactly one of the three cases produces the result of every completed
/// call, and callers must treat all three as reachable:
///
/// - the lock was won → [`on_acquired`](LockCallback::on_acquired) runs as
///   the critical section;
/// - the wait budget expired → [`on_not_acquired`](LockCallback::on_not_acquired);
/// - the critical section failed → the failure is wrapped and handed to
///   [`on_error`](LockCallback::on_error), never rethrown raw.
///
/// # Example
///
/// ```rust,ignore
/// struct Reindex<'a> {
///     catalog: &'a Catalog,
/// }
///
/// impl LockCallback<usize> for Reindex<'_> {
///     async fn on_acquired(&mut self) -> Result<usize, BoxError> {
///         Ok(self.catalog.rebuild().await?)
///     }
///
///     async fn on_not_acquired(&mut self) -> usize {
///         0 // another worker is already rebuilding
///     }
///
///     async fn on_error(&mut self, error: LockError) -> LockResult<usize> {
///         Err(error)
///     }
/// }
/// ```
pub trait LockCallback<T>: Send {
    /// The critical section, invoked while the lock is held.
    ///
    /// Returning `Err` is the "handler raised" case: the failure is wrapped
    /// as [`LockError::CriticalSection`](crate::error::LockError) and routed
    /// to [`on_error`](LockCallback::on_error).
    fn on_acquired(&mut self) -> impl Future<Output = Result<T, BoxError>> + Send;

    /// Invoked when the wait budget expires without winning the lock.
    ///
    /// Not an error: losing the race is a first-class outcome.
    fn on_not_acquired(&mut self) -> impl Future<Output = T> + Send;

    /// Invoked with the wrapped failure when the critical section (or the
    /// TTL-backstop write that precedes it) fails.
    ///
    /// May recover with a fallback value or propagate the error, which then
    /// becomes the call's result.
    fn on_error(&mut self, error: LockError) -> impl Future<Output = LockResult<T>> + Send;
}
