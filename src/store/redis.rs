//! Redis-backed session store.
//!
//! Keys are namespaced as `{namespace}:token:{identity}` and carry the TTL
//! of the token they hold, so entries disappear on their own when the token
//! would have expired anyway. Every network call is wrapped in a bounded
//! timeout; an elapsed timeout or a connection failure surfaces as a
//! [`StoreError`], never as an absent entry.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::{SessionStore, StoreError};

const DEFAULT_NAMESPACE: &str = "authgate";

/// Session store backed by a Redis instance.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    namespace: String,
    op_timeout: Duration,
}

impl RedisSessionStore {
    /// Connect to Redis at `url` (e.g. `redis://localhost:6379/0`).
    ///
    /// The connection manager reconnects on its own after transient
    /// failures; individual operations fail fast with `op_timeout`.
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        let conn = tokio::time::timeout(op_timeout, client.get_connection_manager())
            .await
            .map_err(|_| StoreError::Timeout)?
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        Ok(Self {
            conn,
            namespace: DEFAULT_NAMESPACE.to_string(),
            op_timeout,
        })
    }

    /// Override the key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    fn key(&self, identity: &str) -> String {
        format!("{}:token:{}", self.namespace, identity)
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.op_timeout, op).await {
            Err(_) => Err(StoreError::Timeout),
            Ok(Err(err)) if err.is_timeout() => Err(StoreError::Timeout),
            Ok(Err(err)) => Err(StoreError::Unavailable(err.to_string())),
            Ok(Ok(value)) => Ok(value),
        }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, identity: &str, token: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let key = self.key(identity);
        let token = token.to_string();
        let ttl_secs = ttl.as_secs().max(1);

        self.run(async move { conn.set_ex::<_, _, ()>(key, token, ttl_secs).await })
            .await
    }

    async fn get(&self, identity: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let key = self.key(identity);

        self.run(async move { conn.get::<_, Option<String>>(key).await })
            .await
    }

    async fn delete(&self, identity: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let key = self.key(identity);

        let removed: i64 = self.run(async move { conn.del::<_, i64>(key).await }).await?;
        Ok(removed > 0)
    }
}
