//! Key/value preferences and the `PreferenceStore` implementation.

use super::Store;
use async_trait::async_trait;
use polyglot_core::{error::PolyglotError, language::LanguageCode, traits::PreferenceStore};
use tracing::debug;

impl Store {
    /// Store a preference (upsert by key).
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<(), PolyglotError> {
        sqlx::query(
            "INSERT INTO preferences (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| PolyglotError::Store(format!("upsert preference failed: {e}")))?;

        Ok(())
    }

    /// Get a single preference by key.
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>, PolyglotError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PolyglotError::Store(format!("query failed: {e}")))?;

        Ok(row.map(|(v,)| v))
    }

    /// Delete a preference. Returns `true` if a row was deleted.
    pub async fn delete_preference(&self, key: &str) -> Result<bool, PolyglotError> {
        let result = sqlx::query("DELETE FROM preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| PolyglotError::Store(format!("delete failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PreferenceStore for Store {
    async fn stored_language(&self) -> Result<Option<String>, PolyglotError> {
        self.get_preference(&self.key).await
    }

    async fn store_language(&self, language: &LanguageCode) -> Result<(), PolyglotError> {
        debug!("persisting language preference {language}");
        self.set_preference(&self.key, language.as_str()).await
    }
}
