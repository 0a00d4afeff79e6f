//! Redis lock store implementation.

use fred::prelude::*;
use tracing::debug;

use kvlock_core::error::{LockError, LockResult};
use kvlock_core::traits::LockStore;

/// Builder for Redis lock store configuration.
pub struct RedisLockStoreBuilder {
    url: Option<String>,
    client: Option<RedisClient>,
}

impl RedisLockStoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: None,
            client: None,
        }
    }

    /// Sets the Redis server URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Uses an existing Redis client.
    ///
    /// The client is expected to be connected already; `build` will not
    /// connect it.
    pub fn client(mut self, client: RedisClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the store, connecting to the configured URL if no client was
    /// supplied.
    pub async fn build(self) -> LockResult<RedisLockStore> {
        if let Some(client) = self.client {
            return Ok(RedisLockStore { client });
        }

        let Some(url) = self.url else {
            return Err(LockError::Store(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "no Redis client or URL provided",
            ))));
        };

        let config = RedisConfig::from_url(&url).map_err(|e| {
            LockError::Store(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid Redis URL: {}", e),
            )))
        })?;

        let client = RedisClient::new(config, None, None, None);
        client.connect();
        client.wait_for_connect().await.map_err(|e| {
            LockError::Store(Box::new(std::io::Error::other(format!(
                "failed to connect to Redis: {}",
                e
            ))))
        })?;
        debug!(url = %url, "connected to Redis");

        Ok(RedisLockStore { client })
    }
}

impl Default for RedisLockStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock store backed by a single Redis server.
///
/// Entries live under `namespace:key`. Each contract operation maps to one
/// Redis command; the only atomicity the contract demands, create-if-absent,
/// is SET NX.
#[derive(Clone)]
pub struct RedisLockStore {
    client: RedisClient,
}

impl RedisLockStore {
    /// Returns a new builder for configuring the store.
    pub fn builder() -> RedisLockStoreBuilder {
        RedisLockStoreBuilder::new()
    }

    /// Creates a store connected to the given Redis URL.
    pub async fn new(url: impl Into<String>) -> LockResult<Self> {
        Self::builder().url(url).build().await
    }

    fn full_key(namespace: &str, key: &str) -> String {
        format!("{}:{}", namespace, key)
    }
}

impl LockStore for RedisLockStore {
    async fn set_if_absent(&self, namespace: &str, key: &str, value: &str) -> LockResult<bool> {
        let result: Option<String> = self
            .client
            .set(
                Self::full_key(namespace, key),
                value,
                None,
                Some(SetOptions::NX),
                false,
            )
            .await
            .map_err(|e| {
                LockError::Store(Box::new(std::io::Error::other(format!(
                    "Redis SET NX failed: {}",
                    e
                ))))
            })?;

        // SET NX replies OK when the key was created, nil when it already exists
        Ok(result.is_some())
    }

    async fn expire_at(&self, namespace: &str, key: &str, at_epoch_secs: i64) -> LockResult<()> {
        let _: i64 = self
            .client
            .expire_at(Self::full_key(namespace, key), at_epoch_secs)
            .await
            .map_err(|e| {
                LockError::Store(Box::new(std::io::Error::other(format!(
                    "Redis EXPIREAT failed: {}",
                    e
                ))))
            })?;

        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> LockResult<Option<String>> {
        let value: Option<String> = self
            .client
            .get(Self::full_key(namespace, key))
            .await
            .map_err(|e| {
                LockError::Store(Box::new(std::io::Error::other(format!(
                    "Redis GET failed: {}",
                    e
                ))))
            })?;

        Ok(value)
    }

    async fn delete(&self, namespace: &str, key: &str) -> LockResult<()> {
        let _: i64 = self
            .client
            .del(Self::full_key(namespace, key))
            .await
            .map_err(|e| {
                LockError::Store(Box::new(std::io::Error::other(format!(
                    "Redis DEL failed: {}",
                    e
                ))))
            })?;

        Ok(())
    }
}
