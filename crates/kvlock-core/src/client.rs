//! The lock client: bounded-retry acquisition, stale-entry reclamation, and
//! the two-phase release protocol.

use std::panic::AssertUnwindSafe;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::FutureExt;
use tracing::{debug, instrument, warn};

use crate::cadence::RetryCadence;
use crate::entry::{owner_token, LockEntry, LOCK_NAMESPACE, XID_LOCK_NAMESPACE};
use crate::error::{LockError, LockResult};
use crate::traits::{LockCallback, LockStore};

/// Current wall-clock time in milliseconds since the Unix epoch.
fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Instants and budgets derived once per acquisition call.
///
/// Everything is computed from the wall clock captured at call entry; the
/// stale check at the end of a failed call compares against this original
/// capture, not a refreshed timestamp.
#[derive(Debug, Clone, Copy)]
struct AcquireSchedule {
    /// Wall clock at call entry (ms since epoch).
    started_at_millis: i64,
    /// Store-side backstop expiry (s since epoch).
    store_expire_at_secs: i64,
    /// Deadline embedded in the entry value (ms since epoch).
    holder_deadline_millis: i64,
    /// Instant after which polling stops even with attempts left.
    poll_deadline_millis: i64,
    /// Attempt budget: the timeout divided by the cadence interval.
    max_attempts: i64,
    /// Sleep between attempts.
    interval: Duration,
}

impl AcquireSchedule {
    fn new(cadence: RetryCadence, timeout: Duration, ttl: Duration) -> Self {
        let now = epoch_millis();
        let interval = cadence.interval();
        let interval_millis = interval.as_millis() as i64;
        let timeout_millis = timeout.as_millis() as i64;
        Self {
            started_at_millis: now,
            store_expire_at_secs: now / 1000 + ttl.as_secs() as i64,
            holder_deadline_millis: now + ttl.as_millis() as i64,
            poll_deadline_millis: now + timeout_millis - interval_millis,
            max_attempts: timeout_millis / interval_millis,
            interval,
        }
    }
}

/// Client-side distributed mutual-exclusion lock over a [`LockStore`].
///
/// The client keeps no state of its own: the lock entry in the backing
/// store is the only shared mutable resource, so a single client value can
/// be used concurrently from any number of tasks, and independent processes
/// pointed at the same store contend correctly with each other.
///
/// Waiting is a plain poll loop: each contender retries `set_if_absent` at
/// its cadence until it wins, its timeout budget runs out, or it finds a
/// crashed holder's entry to reclaim. There is no queue and no fairness
/// among waiters; whichever contender's attempt lands first wins.
///
/// # Example
///
/// ```rust,ignore
/// let client = LockClient::new(store);
/// let shipped = client
///     .acquire("order:1001", Duration::from_secs(2), Duration::from_secs(5), ShipOrder { .. })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct LockClient<S> {
    store: S,
}

impl<S> LockClient<S> {
    /// Creates a client over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the injected store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: LockStore> LockClient<S> {
    /// Acquires the lock on `key` and drives `callback` with the outcome,
    /// polling at [`RetryCadence::Normal`].
    ///
    /// The lock is released on every exit path of the call: after the
    /// critical section returns, after a failure is delegated to
    /// [`on_error`](LockCallback::on_error), and while unwinding from a
    /// panic. `ttl` caps how long the entry may outlive a crashed process
    /// and should comfortably exceed the expected critical-section
    /// duration.
    ///
    /// A `timeout` smaller than one cadence interval leaves no attempt
    /// budget at all; such a call reports `on_not_acquired` without ever
    /// polling the store.
    pub async fn acquire<T, C>(
        &self,
        key: &str,
        timeout: Duration,
        ttl: Duration,
        callback: C,
    ) -> LockResult<T>
    where
        C: LockCallback<T>,
    {
        self.acquire_with_cadence(key, RetryCadence::default(), timeout, ttl, callback)
            .await
    }

    /// [`acquire`](Self::acquire) with an explicit retry cadence.
    #[instrument(skip(self, callback), fields(namespace = LOCK_NAMESPACE))]
    pub async fn acquire_with_cadence<T, C>(
        &self,
        key: &str,
        cadence: RetryCadence,
        timeout: Duration,
        ttl: Duration,
        mut callback: C,
    ) -> LockResult<T>
    where
        C: LockCallback<T>,
    {
        let schedule = AcquireSchedule::new(cadence, timeout, ttl);
        let value = LockEntry::simple(schedule.holder_deadline_millis).encode();

        if !self
            .poll_until_created(LOCK_NAMESPACE, key, &value, &schedule)
            .await?
        {
            self.reclaim_if_stale(LOCK_NAMESPACE, key, schedule.started_at_millis)
                .await?;
            return Ok(callback.on_not_acquired().await);
        }

        // Held from here on. The entry must be deleted on every exit path,
        // so the whole callback dispatch runs under catch_unwind and the
        // delete sits between it and the return.
        let outcome = AssertUnwindSafe(async {
            match self
                .critical_section(
                    LOCK_NAMESPACE,
                    key,
                    schedule.store_expire_at_secs,
                    &mut callback,
                )
                .await
            {
                Ok(result) => Ok(result),
                Err(error) => {
                    debug!(key, %error, "critical section failed, delegating to on_error");
                    callback.on_error(error).await
                }
            }
        })
        .catch_unwind()
        .await;

        let cleanup = self.store.delete(LOCK_NAMESPACE, key).await;
        match outcome {
            Ok(result) => {
                cleanup?;
                result
            }
            Err(panic) => {
                if let Err(error) = cleanup {
                    warn!(key, %error, "failed to delete lock entry while unwinding");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    /// Acquires a two-phase lock on `key` owned by the transaction `xid`,
    /// polling at [`RetryCadence::Normal`].
    ///
    /// Unlike [`acquire`](Self::acquire), a successful critical section
    /// leaves the entry in place: ownership persists beyond this call until
    /// a later [`release_tcc`](Self::release_tcc) presents the same `xid`,
    /// the TTL backstop fires, or a contender reclaims the entry as stale.
    /// A failed (or panicking) critical section still deletes the entry
    /// before the failure is surfaced.
    pub async fn acquire_tcc<T, C>(
        &self,
        key: &str,
        xid: &str,
        timeout: Duration,
        ttl: Duration,
        callback: C,
    ) -> LockResult<T>
    where
        C: LockCallback<T>,
    {
        self.acquire_tcc_with_cadence(key, xid, RetryCadence::default(), timeout, ttl, callback)
            .await
    }

    /// [`acquire_tcc`](Self::acquire_tcc) with an explicit retry cadence.
    #[instrument(skip(self, callback), fields(namespace = XID_LOCK_NAMESPACE))]
    pub async fn acquire_tcc_with_cadence<T, C>(
        &self,
        key: &str,
        xid: &str,
        cadence: RetryCadence,
        timeout: Duration,
        ttl: Duration,
        mut callback: C,
    ) -> LockResult<T>
    where
        C: LockCallback<T>,
    {
        let schedule = AcquireSchedule::new(cadence, timeout, ttl);
        let token = owner_token(xid, key);
        let value = LockEntry::two_phase(schedule.holder_deadline_millis, token).encode();

        if !self
            .poll_until_created(XID_LOCK_NAMESPACE, key, &value, &schedule)
            .await?
        {
            self.reclaim_if_stale(XID_LOCK_NAMESPACE, key, schedule.started_at_millis)
                .await?;
            return Ok(callback.on_not_acquired().await);
        }

        // Held. No auto-release on success, so only the failure paths clean
        // up here; the entry otherwise waits for release_tcc.
        let section = AssertUnwindSafe(self.critical_section(
            XID_LOCK_NAMESPACE,
            key,
            schedule.store_expire_at_secs,
            &mut callback,
        ))
        .catch_unwind()
        .await;

        match section {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(error)) => {
                self.store.delete(XID_LOCK_NAMESPACE, key).await?;
                debug!(key, %error, "critical section failed, delegating to on_error");
                callback.on_error(error).await
            }
            Err(panic) => {
                if let Err(error) = self.store.delete(XID_LOCK_NAMESPACE, key).await {
                    warn!(key, %error, "failed to delete lock entry while unwinding");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    /// Releases a two-phase lock if and only if it is still owned by `xid`.
    ///
    /// Absent entries, undecodable values, and mismatched owner tokens are
    /// all silent no-ops: a late release arriving after the entry was
    /// reclaimed and re-acquired by another transaction is an expected
    /// race, not a caller bug, and this call must never delete another
    /// party's entry. The token check and the delete are two separate store
    /// operations; the two-phase test module describes the window this
    /// leaves open.
    #[instrument(skip(self), fields(namespace = XID_LOCK_NAMESPACE))]
    pub async fn release_tcc(&self, key: &str, xid: &str) -> LockResult<()> {
        let token = owner_token(xid, key);
        let Some(value) = self.store.get(XID_LOCK_NAMESPACE, key).await? else {
            return Ok(());
        };
        let owned = LockEntry::decode(&value)
            .and_then(|entry| entry.owner_token)
            .is_some_and(|stored| stored == token);
        if owned {
            debug!(key, "owner token matched, deleting two-phase lock entry");
            self.store.delete(XID_LOCK_NAMESPACE, key).await?;
        }
        Ok(())
    }

    /// Sets the store-side TTL backstop, then runs the critical section.
    ///
    /// Any failure in here happened while the lock was held, so the caller
    /// routes it to `on_error` rather than returning it raw.
    async fn critical_section<T, C>(
        &self,
        namespace: &str,
        key: &str,
        expire_at_secs: i64,
        callback: &mut C,
    ) -> LockResult<T>
    where
        C: LockCallback<T>,
    {
        self.store.expire_at(namespace, key, expire_at_secs).await?;
        callback
            .on_acquired()
            .await
            .map_err(LockError::CriticalSection)
    }

    /// Polls set-if-absent until the entry is created, the attempt budget
    /// is exhausted, or the poll deadline passes.
    ///
    /// The deadline check runs after each failed attempt, before the sleep,
    /// so the loop stops early once the remaining budget is smaller than
    /// one interval. Store errors propagate raw; they are infrastructure
    /// failures, not lock outcomes.
    async fn poll_until_created(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
        schedule: &AcquireSchedule,
    ) -> LockResult<bool> {
        for attempt in 0..schedule.max_attempts {
            if self.store.set_if_absent(namespace, key, value).await? {
                debug!(key, attempt, "lock entry created");
                return Ok(true);
            }
            if epoch_millis() >= schedule.poll_deadline_millis {
                debug!(key, attempt, "poll deadline reached, stopping before the attempt budget");
                break;
            }
            debug!(key, attempt, "lock held elsewhere, retrying");
            tokio::time::sleep(schedule.interval).await;
        }
        Ok(false)
    }

    /// Deletes the current entry if its embedded deadline had already
    /// passed when this call started, clearing the way for the next
    /// contender.
    ///
    /// Best-effort: the reclaiming call itself still reports not-acquired.
    /// Staleness is judged against the instant captured at call entry, not
    /// a refreshed clock.
    async fn reclaim_if_stale(
        &self,
        namespace: &str,
        key: &str,
        observed_at_millis: i64,
    ) -> LockResult<()> {
        let Some(value) = self.store.get(namespace, key).await? else {
            return Ok(());
        };
        if value.trim().is_empty() {
            return Ok(());
        }
        match LockEntry::decode(&value) {
            Some(entry) if entry.is_stale_at(observed_at_millis) => {
                warn!(
                    key,
                    deadline_millis = entry.deadline_millis,
                    observed_at_millis,
                    "holder deadline passed, deleting stale lock entry"
                );
                self.store.delete(namespace, key).await?;
            }
            Some(_) => {}
            None => {
                warn!(key, value = %value, "undecodable lock entry value, leaving entry in place");
            }
        }
        Ok(())
    }
}
