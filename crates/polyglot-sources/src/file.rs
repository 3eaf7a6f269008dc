//! Directory translation source: one `<code>.json` file per language.

use async_trait::async_trait;
use polyglot_core::{
    error::PolyglotError, language::LanguageCode, table::TranslationTable,
    traits::TranslationSource,
};
use std::path::PathBuf;
use tracing::debug;

/// Reads tables from `<dir>/<code>.json`.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `language`'s table.
    pub fn path_for(&self, language: &LanguageCode) -> PathBuf {
        self.dir.join(format!("{language}.json"))
    }
}

#[async_trait]
impl TranslationSource for DirectorySource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, language: &LanguageCode) -> Result<TranslationTable, PolyglotError> {
        let path = self.path_for(language);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PolyglotError::Source(format!("failed to read {}: {e}", path.display())))?;
        let table = TranslationTable::from_json_str(&text)?;
        debug!("loaded {} ({} entries)", path.display(), table.len());
        Ok(table)
    }
}
