//! Document synchronization: pushes translations into a bound markup surface.
//!
//! Per element carrying the key attribute, the translated value goes to:
//! 1. the attribute named by the target-attribute override, if present;
//! 2. the placeholder attribute, for input-style elements;
//! 3. the element text otherwise.
//!
//! Selector hosts get `data-current-language` and `data-languages`; how the
//! selector is drawn is up to the host.

use polyglot_core::{
    config::DocumentConfig,
    traits::{DocumentSurface, Element},
    LanguageCode, PolyglotError, SupportedLanguages,
};
use serde::{Deserialize, Serialize};

/// Attribute set on selector hosts with the active language.
pub const CURRENT_LANGUAGE_ATTRIBUTE: &str = "data-current-language";
/// Attribute set on selector hosts with the comma-joined supported list.
pub const LANGUAGES_ATTRIBUTE: &str = "data-languages";

/// What a synchronization pass touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub translated: usize,
    pub selectors: usize,
}

/// Applies translations to a [`DocumentSurface`] according to a [`DocumentConfig`].
#[derive(Debug, Clone, Default)]
pub struct DocumentBinding {
    config: DocumentConfig,
}

impl DocumentBinding {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    /// Run one pass over `surface`, resolving keys through `translate`.
    pub fn sync(
        &self,
        surface: &mut dyn DocumentSurface,
        language: &LanguageCode,
        supported: &SupportedLanguages,
        mut translate: impl FnMut(&str) -> String,
    ) -> SyncReport {
        let cfg = &self.config;
        let languages = supported
            .iter()
            .map(LanguageCode::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let mut report = SyncReport::default();

        surface.set_root_language(language);
        surface.visit_elements(&mut |element: &mut Element| {
            if let Some(key) = element.attribute(&cfg.key_attribute).map(str::to_string) {
                let value = translate(&key);
                let target = element
                    .attribute(&cfg.target_attribute)
                    .filter(|t| !t.trim().is_empty())
                    .map(|t| t.trim().to_string());

                if let Some(target) = target {
                    element.set_attribute(&target, value);
                } else if cfg.input_tags.iter().any(|t| t.eq_ignore_ascii_case(&element.tag)) {
                    element.set_attribute(&cfg.placeholder_attribute, value);
                } else {
                    element.text = value;
                }
                report.translated += 1;
            }

            if element.attributes.contains_key(&cfg.selector_attribute) {
                element.set_attribute(CURRENT_LANGUAGE_ATTRIBUTE, language.as_str());
                element.set_attribute(LANGUAGES_ATTRIBUTE, languages.as_str());
                report.selectors += 1;
            }
        });

        report
    }
}

/// A document held in memory: a root language plus elements in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDocument {
    /// Root-level language attribute.
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl MemoryDocument {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            lang: String::new(),
            elements,
        }
    }

    /// Parse a document. The top level must be a JSON object.
    pub fn from_json_str(text: &str) -> Result<Self, PolyglotError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| PolyglotError::Document(format!("invalid document JSON: {e}")))?;
        if !value.is_object() {
            return Err(PolyglotError::Document(
                "document must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| PolyglotError::Document(format!("invalid document JSON: {e}")))
    }

    pub fn to_json_pretty(&self) -> Result<String, PolyglotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// First element whose `attribute` equals `value`.
    pub fn find(&self, attribute: &str, value: &str) -> Option<&Element> {
        self.elements
            .iter()
            .find(|e| e.attribute(attribute) == Some(value))
    }
}

impl DocumentSurface for MemoryDocument {
    fn set_root_language(&mut self, language: &LanguageCode) {
        self.lang = language.to_string();
    }

    fn visit_elements(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        for element in &mut self.elements {
            visit(element);
        }
    }
}
