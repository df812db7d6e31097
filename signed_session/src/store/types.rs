use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::session::{SessionData, SessionId};
use crate::store::errors::StorageError;

/// A single entry held by [`MemoryStore`]. The payload is the JSON encoding
/// of the session data, mirroring what a networked backend would hold.
#[derive(Debug, Clone)]
pub(super) struct StoredEntry {
    pub(super) payload: String,
    pub(super) expires_at: DateTime<Utc>,
}

/// Reference in-memory session store, used by tests and as the contract's
/// executable documentation.
pub struct MemoryStore {
    pub(super) entries: Mutex<HashMap<String, StoredEntry>>,
}

/// The key/value contract a session backend must satisfy.
///
/// Implementations take `&self` and handle their own synchronization so a
/// store can be shared as `Arc<dyn SessionStore>` across requests. Every
/// operation must be independently safe to retry: two concurrent writers to
/// the same id race with last-write-wins semantics, which is a documented
/// limitation of this contract rather than something a backend must solve.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Fetch the data stored under `id`, if any. Expired entries are misses.
    async fn get(&self, id: &SessionId) -> Result<Option<SessionData>, StorageError>;

    /// Write `data` under `id`, expiring after `ttl_seconds`.
    async fn set(
        &self,
        id: &SessionId,
        data: &SessionData,
        ttl_seconds: u64,
    ) -> Result<(), StorageError>;

    /// Remove the entry stored under `id`. Removing an absent entry is not
    /// an error.
    async fn destroy(&self, id: &SessionId) -> Result<(), StorageError>;

    /// Refresh the TTL of the entry under `id` without logically rewriting
    /// it. Backends without a cheaper primitive fall back to a full write.
    async fn touch(
        &self,
        id: &SessionId,
        data: &SessionData,
        ttl_seconds: u64,
    ) -> Result<(), StorageError> {
        self.set(id, data, ttl_seconds).await
    }

    /// Every live session in the store. Introspection only; backends may
    /// decline.
    async fn all(&self) -> Result<Vec<(SessionId, SessionData)>, StorageError> {
        Err(StorageError::Unsupported("all"))
    }

    /// Number of live sessions in the store. Introspection only; backends
    /// may decline.
    async fn count(&self) -> Result<usize, StorageError> {
        Err(StorageError::Unsupported("count"))
    }
}
