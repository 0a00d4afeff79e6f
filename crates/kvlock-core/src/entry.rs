//! Lock entry layout: namespaces, stored values, and owner tokens.
//!
//! A lock is a single record in the backing store under a (namespace, key)
//! pair. The namespace separates the two locking disciplines so they never
//! collide on the same key:
//!
//! - [`LOCK_NAMESPACE`] entries store the holder's deadline as a bare
//!   millisecond timestamp, e.g. `"1700000005000"`.
//! - [`XID_LOCK_NAMESPACE`] entries append the owner token after a comma,
//!   e.g. `"1700000005000,tx-42order:1001"`.
//!
//! The deadline is the absolute wall-clock instant (milliseconds since the
//! Unix epoch) at which the holder's TTL expires. Contenders that find the
//! key taken read this value back to decide whether the holder has crashed
//! and the entry can be reclaimed.

/// Namespace for simple-mode entries, released unconditionally by their
/// creator.
pub const LOCK_NAMESPACE: &str = "LOCK";

/// Namespace for two-phase entries, released only by a matching owner token.
pub const XID_LOCK_NAMESPACE: &str = "XIDLOCK";

/// Separator between the deadline field and the owner token.
const VALUE_DELIMITER: char = ',';

/// Builds the owner token identifying which transaction holds a two-phase
/// lock: the transaction id concatenated with the lock key.
pub fn owner_token(xid: &str, key: &str) -> String {
    format!("{xid}{key}")
}

/// A decoded lock entry value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEntry {
    /// Absolute instant (ms since epoch) at which the holder's TTL expires.
    pub deadline_millis: i64,
    /// Owner token for two-phase entries; `None` for simple-mode entries.
    pub owner_token: Option<String>,
}

impl LockEntry {
    /// Creates a simple-mode entry.
    pub fn simple(deadline_millis: i64) -> Self {
        Self {
            deadline_millis,
            owner_token: None,
        }
    }

    /// Creates a two-phase entry owned by `token`.
    pub fn two_phase(deadline_millis: i64, token: impl Into<String>) -> Self {
        Self {
            deadline_millis,
            owner_token: Some(token.into()),
        }
    }

    /// Renders the value stored in the backing store.
    pub fn encode(&self) -> String {
        match &self.owner_token {
            Some(token) => format!("{}{}{}", self.deadline_millis, VALUE_DELIMITER, token),
            None => self.deadline_millis.to_string(),
        }
    }

    /// Parses a stored value.
    ///
    /// The field before the first delimiter (or the whole value when there
    /// is none) must parse as the deadline; anything after it is the owner
    /// token. Returns `None` for values this crate could not have written.
    pub fn decode(value: &str) -> Option<Self> {
        match value.split_once(VALUE_DELIMITER) {
            Some((deadline, token)) => Some(Self {
                deadline_millis: deadline.parse().ok()?,
                owner_token: Some(token.to_string()),
            }),
            None => Some(Self {
                deadline_millis: value.parse().ok()?,
                owner_token: None,
            }),
        }
    }

    /// Whether the holder's deadline had already passed at `now_millis`.
    ///
    /// Strictly past: an entry expiring exactly now is still live.
    pub fn is_stale_at(&self, now_millis: i64) -> bool {
        now_millis > self.deadline_millis
    }
}
