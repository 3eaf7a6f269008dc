use crate::{error::PolyglotError, language::LanguageCode, table::TranslationTable};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Translation data source: one table per language.
///
/// Every backend (HTTP, a directory on disk, embedded tables) implements this
/// trait. A non-success status and a parse failure are both load failures.
#[async_trait]
pub trait TranslationSource: Send + Sync {
    /// Human-readable source name.
    fn name(&self) -> &str;

    /// Fetch and parse the table for `language`.
    async fn fetch(&self, language: &LanguageCode) -> Result<TranslationTable, PolyglotError>;
}

/// Persistent store holding the last confirmed language.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read the stored preference, if any. The raw value is returned so the
    /// resolver can decide whether it is still supported.
    async fn stored_language(&self) -> Result<Option<String>, PolyglotError>;

    /// Persist `language` as the new preference.
    async fn store_language(&self, language: &LanguageCode) -> Result<(), PolyglotError>;
}

/// The request/address the application was opened with.
pub trait RequestContext: Send + Sync {
    /// Explicit language override carried by the request, if any.
    fn language_param(&self) -> Option<String>;

    /// Rewrite the override in place, without navigating.
    fn replace_language_param(&self, language: &LanguageCode);
}

/// One element of a bound document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Lowercase tag name, e.g. `p` or `input`.
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Text content.
    #[serde(default)]
    pub text: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Builder-style attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }
}

/// Markup surface a localizer pushes translations into.
pub trait DocumentSurface {
    /// Keep the root-level language attribute in sync.
    fn set_root_language(&mut self, language: &LanguageCode);

    /// Visit every element in document order.
    fn visit_elements(&mut self, visit: &mut dyn FnMut(&mut Element));
}
