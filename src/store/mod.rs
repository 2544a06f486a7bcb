//! Server-side session store
//!
//! The store maps a principal identity (email) to the single currently-valid
//! token for that identity, with a per-entry TTL. It is the source of truth
//! for "is this token still live": a token whose signature is still valid is
//! rejected the moment its store entry is deleted or replaced.
//!
//! An unreachable backend must surface as [`StoreError`], never as an absent
//! entry; reporting an outage as "no token" would revoke every live session.

use std::time::Duration;

use async_trait::async_trait;

pub mod memory;
pub mod redis;

pub use self::memory::MemorySessionStore;
pub use self::redis::RedisSessionStore;

/// Session store errors. Both kinds are infrastructure failures and are
/// retryable; neither means the entry is absent.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("session store operation timed out")]
    Timeout,
}

/// Storage interface for live session tokens, one entry per identity.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Upsert the live token for `identity`, replacing any previous entry,
    /// with an absolute expiry of now + `ttl`.
    async fn put(&self, identity: &str, token: &str, ttl: Duration) -> Result<(), StoreError>;

    /// The currently stored token, or `None` if never set, deleted, or
    /// expired.
    async fn get(&self, identity: &str) -> Result<Option<String>, StoreError>;

    /// Remove the entry for `identity`. Returns whether an entry existed;
    /// deleting a non-existent entry is not an error.
    async fn delete(&self, identity: &str) -> Result<bool, StoreError>;
}
