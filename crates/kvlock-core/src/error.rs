//! Error types for lock operations.

use thiserror::Error;

/// Boxed error type accepted from caller code and store backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during lock operations.
///
/// Failing to win a lock is not an error: the bounded wait expiring and the
/// stale-entry reclaim both surface through
/// [`LockCallback::on_not_acquired`](crate::traits::LockCallback::on_not_acquired).
#[derive(Error, Debug)]
pub enum LockError {
    /// Caller logic failed while the lock was held.
    ///
    /// Raised failures are never propagated raw out of an acquisition call;
    /// they are wrapped in this variant and delegated to
    /// [`LockCallback::on_error`](crate::traits::LockCallback::on_error).
    #[error("critical section failed while holding lock: {0}")]
    CriticalSection(#[source] BoxError),

    /// A backing-store operation failed.
    #[error("store error: {0}")]
    Store(#[source] BoxError),
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
