//! Preference store that lives only as long as the process.

use async_trait::async_trait;
use polyglot_core::{error::PolyglotError, language::LanguageCode, traits::PreferenceStore};
use std::sync::Mutex;

/// Keeps the preference in memory. Optionally seeded with a prior value.
#[derive(Debug, Default)]
pub struct InProcessStore {
    value: Mutex<Option<String>>,
}

impl InProcessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored, as if from a previous session.
    pub fn seeded(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

#[async_trait]
impl PreferenceStore for InProcessStore {
    async fn stored_language(&self) -> Result<Option<String>, PolyglotError> {
        self.value
            .lock()
            .map(|v| v.clone())
            .map_err(|_| PolyglotError::Store("preference lock poisoned".to_string()))
    }

    async fn store_language(&self, language: &LanguageCode) -> Result<(), PolyglotError> {
        let mut value = self
            .value
            .lock()
            .map_err(|_| PolyglotError::Store("preference lock poisoned".to_string()))?;
        *value = Some(language.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let store = InProcessStore::new();
        assert_eq!(store.stored_language().await.unwrap(), None);
        store
            .store_language(&LanguageCode::parse("pt").unwrap())
            .await
            .unwrap();
        assert_eq!(store.stored_language().await.unwrap().as_deref(), Some("pt"));
    }

    #[tokio::test]
    async fn test_seeded_value_is_returned_raw() {
        let store = InProcessStore::seeded("fr");
        assert_eq!(store.stored_language().await.unwrap().as_deref(), Some("fr"));
    }
}
