use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_core::model::UserProgress;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{
    ProgressRecordRepository, StorageError, decode_progress, encode_progress,
};

#[async_trait]
impl ProgressRecordRepository for SqliteRepository {
    async fn get_progress(&self, key: &str) -> Result<Option<UserProgress>, StorageError> {
        let row = sqlx::query("SELECT value FROM progress_records WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        decode_progress(&value).map(Some)
    }

    async fn save_progress(
        &self,
        key: &str,
        progress: &UserProgress,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let value = encode_progress(progress)?;

        sqlx::query(
            r"
            INSERT INTO progress_records (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn delete_progress(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM progress_records WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
