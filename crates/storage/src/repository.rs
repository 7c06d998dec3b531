use async_trait::async_trait;
use quiz_core::model::StorageKey;
use quiz_core::reducer::PersistOp;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable per-device key/value store for session fields.
///
/// Values are opaque strings; shape validation happens when they are
/// hydrated, not here.
#[async_trait]
pub trait KeyValueRepository: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Write or overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: StorageKey) -> Result<(), StorageError>;

    /// Apply a single write produced by the session reducer.
    ///
    /// # Errors
    ///
    /// Propagates the underlying `set`/`remove` failure.
    async fn apply(&self, op: &PersistOp) -> Result<(), StorageError> {
        match op {
            PersistOp::Set { key, value } => self.set(*key, value).await,
            PersistOp::Remove { key } => self.remove(*key).await,
        }
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Seed a raw value, bypassing the session reducer.
    pub fn insert_raw(&self, key: StorageKey, value: impl Into<String>) {
        if let Ok(mut guard) = self.values.lock() {
            guard.insert(key, value.into());
        }
    }

    /// Snapshot of a raw value, for assertions.
    #[must_use]
    pub fn raw(&self, key: StorageKey) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|guard| guard.get(&key).cloned())
    }
}

#[async_trait]
impl KeyValueRepository for InMemoryRepository {
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub session: Arc<dyn KeyValueRepository>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn applies_reducer_writes_in_order() {
        let repo = InMemoryRepository::new();
        repo.apply(&PersistOp::Set {
            key: StorageKey::BirthYear,
            value: "1999".into(),
        })
        .await
        .unwrap();
        assert_eq!(repo.raw(StorageKey::BirthYear).as_deref(), Some("1999"));

        repo.apply(&PersistOp::Remove {
            key: StorageKey::BirthYear,
        })
        .await
        .unwrap();
        assert_eq!(repo.get(StorageKey::BirthYear).await.unwrap(), None);
    }

    #[tokio::test]
    async fn removing_missing_key_is_ok() {
        let repo = InMemoryRepository::new();
        repo.remove(StorageKey::Result).await.unwrap();
        assert!(repo.get(StorageKey::Result).await.unwrap().is_none());
    }
}
