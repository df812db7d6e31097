use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::session::{SessionData, SessionId};
use crate::store::errors::StorageError;
use crate::store::types::{MemoryStore, SessionStore, StoredEntry};

impl MemoryStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory session store");
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, id: &SessionId) -> Result<Option<SessionData>, StorageError> {
        let mut entries = self.entries.lock().await;
        match entries.get(id.as_str()) {
            Some(entry) if entry.expires_at <= Utc::now() => {
                // Lazy eviction: an expired entry is removed on first read.
                entries.remove(id.as_str());
                Ok(None)
            }
            Some(entry) => {
                let data: SessionData = serde_json::from_str(&entry.payload)?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        id: &SessionId,
        data: &SessionData,
        ttl_seconds: u64,
    ) -> Result<(), StorageError> {
        let entry = StoredEntry {
            payload: serde_json::to_string(data)?,
            expires_at: Utc::now() + Duration::seconds(ttl_seconds as i64),
        };
        self.entries
            .lock()
            .await
            .insert(id.as_str().to_string(), entry);
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), StorageError> {
        self.entries.lock().await.remove(id.as_str());
        Ok(())
    }

    async fn touch(
        &self,
        id: &SessionId,
        data: &SessionData,
        ttl_seconds: u64,
    ) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(id.as_str()) {
            Some(entry) => {
                entry.expires_at = Utc::now() + Duration::seconds(ttl_seconds as i64);
                Ok(())
            }
            None => {
                drop(entries);
                self.set(id, data, ttl_seconds).await
            }
        }
    }

    async fn all(&self) -> Result<Vec<(SessionId, SessionData)>, StorageError> {
        let now = Utc::now();
        let entries = self.entries.lock().await;
        let mut sessions = Vec::new();
        for (key, entry) in entries.iter() {
            if entry.expires_at <= now {
                continue;
            }
            let data: SessionData = serde_json::from_str(&entry.payload)?;
            sessions.push((SessionId::from_raw(key.clone()), data));
        }
        Ok(sessions)
    }

    async fn count(&self) -> Result<usize, StorageError> {
        let now = Utc::now();
        let entries = self.entries.lock().await;
        Ok(entries.values().filter(|e| e.expires_at > now).count())
    }
}
