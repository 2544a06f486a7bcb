//! In-process session store backed by a concurrent map.
//!
//! Used by tests and single-node deployments. Entries expire lazily: an
//! expired entry is treated as absent on read and removed at that point.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{SessionStore, StoreError};

struct Entry {
    token: String,
    expires_at: Instant,
}

/// Session store keeping entries in process memory.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, Entry>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, identity: &str, token: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries.insert(
            identity.to_string(),
            Entry {
                token: token.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, identity: &str) -> Result<Option<String>, StoreError> {
        // The guard must be dropped before removing, or the shard deadlocks.
        let expired = match self.entries.get(identity) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.token.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries
                .remove_if(identity, |_, entry| entry.expires_at <= Instant::now());
        }

        Ok(None)
    }

    async fn delete(&self, identity: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(identity).is_some())
    }
}
