use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_core::model::UserProgress;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
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

/// Encodes progress in the persisted record shape.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_progress(progress: &UserProgress) -> Result<String, StorageError> {
    serde_json::to_string(progress).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decodes a persisted record.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for corrupt or mistyped records.
pub fn decode_progress(raw: &str) -> Result<UserProgress, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Durable home of the learner's progress record.
///
/// Each key holds one whole `UserProgress`; writes replace the record. There is no
/// versioning, so concurrent writers sharing a backend are last-write-wins.
#[async_trait]
pub trait ProgressRecordRepository: Send + Sync {
    /// Fetch the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the record is corrupt, or other storage errors.
    async fn get_progress(&self, key: &str) -> Result<Option<UserProgress>, StorageError>;

    /// Replace the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_progress(
        &self,
        key: &str,
        progress: &UserProgress,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Remove the record under `key`. Removing a missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend is unavailable.
    async fn delete_progress(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
struct StoredRecord {
    value: String,
    saved_at: Option<DateTime<Utc>>,
}

/// In-memory repository for tests and prototyping.
///
/// Records are kept serialized so corrupt payloads can be planted with `put_raw`, and
/// `set_unavailable` simulates a backend that refuses every call.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<HashMap<String, StoredRecord>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` verbatim under `key`, bypassing encoding.
    pub fn put_raw(&self, key: &str, value: impl Into<String>) {
        if let Ok(mut guard) = self.records.lock() {
            guard.insert(
                key.to_owned(),
                StoredRecord {
                    value: value.into(),
                    saved_at: None,
                },
            );
        }
    }

    /// The serialized record under `key`, if any.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.records
            .lock()
            .ok()
            .and_then(|guard| guard.get(key).map(|record| record.value.clone()))
    }

    #[must_use]
    pub fn saved_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.records
            .lock()
            .ok()
            .and_then(|guard| guard.get(key).and_then(|record| record.saved_at))
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("storage unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressRecordRepository for InMemoryRepository {
    async fn get_progress(&self, key: &str) -> Result<Option<UserProgress>, StorageError> {
        self.check_available()?;
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .get(key)
            .map(|record| decode_progress(&record.value))
            .transpose()
    }

    async fn save_progress(
        &self,
        key: &str,
        progress: &UserProgress,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.check_available()?;
        let value = encode_progress(progress)?;
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(
            key.to_owned(),
            StoredRecord {
                value,
                saved_at: Some(saved_at),
            },
        );
        Ok(())
    }

    async fn delete_progress(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Repositories behind trait objects so the backend can be swapped.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRecordRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progress: Arc::new(InMemoryRepository::new()),
        }
    }
}
