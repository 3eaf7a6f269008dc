//! In-process translation source for embedded tables and tests.

use async_trait::async_trait;
use polyglot_core::{
    error::PolyglotError, language::LanguageCode, table::TranslationTable,
    traits::TranslationSource,
};
use std::collections::HashMap;

/// Serves tables registered up front. Unknown languages fail like a 404.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    tables: HashMap<LanguageCode, TranslationTable>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table for `language`.
    pub fn with_table(mut self, language: LanguageCode, table: TranslationTable) -> Self {
        self.tables.insert(language, table);
        self
    }

    /// Register a table given as JSON text.
    pub fn with_json(self, language: LanguageCode, json: &str) -> Result<Self, PolyglotError> {
        let table = TranslationTable::from_json_str(json)?;
        Ok(self.with_table(language, table))
    }

    pub fn languages(&self) -> impl Iterator<Item = &LanguageCode> {
        self.tables.keys()
    }
}

#[async_trait]
impl TranslationSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, language: &LanguageCode) -> Result<TranslationTable, PolyglotError> {
        self.tables
            .get(language)
            .cloned()
            .ok_or_else(|| PolyglotError::Source(format!("no table registered for '{language}'")))
    }
}
