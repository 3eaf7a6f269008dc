mod defaults;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::PolyglotError;
use crate::language::{LanguageCode, SupportedLanguages};
use defaults::*;

/// Top-level polyglot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub languages: LanguagesConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub format: FormatConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for a log file. Empty = stderr only.
    #[serde(default)]
    pub log_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

/// Supported languages and the fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesConfig {
    #[serde(default = "default_supported")]
    pub supported: Vec<String>,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            supported: default_supported(),
            fallback: default_fallback(),
        }
    }
}

impl LanguagesConfig {
    /// Validate and build the supported set.
    pub fn to_supported(&self) -> Result<SupportedLanguages, PolyglotError> {
        SupportedLanguages::new(&self.supported, &self.fallback)
    }
}

/// Which backend serves translation tables.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// `<dir>/<code>.json` on the local filesystem (default).
    #[default]
    File,
    /// An HTTP endpoint built from `url_template`.
    Http,
}

/// Translation source config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default = "default_locales_dir")]
    pub dir: String,
    /// URL with a `{lang}` placeholder for the language code.
    #[serde(default = "default_url_template")]
    pub url_template: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            dir: default_locales_dir(),
            url_template: default_url_template(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Preference store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Key the preference is stored under.
    #[serde(default = "default_store_key")]
    pub key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            db_path: default_db_path(),
            key: default_store_key(),
        }
    }
}

/// Request context config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Query parameter carrying an explicit language override.
    #[serde(default = "default_request_param")]
    pub param: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            param: default_request_param(),
        }
    }
}

/// Attribute names used when binding a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Holds the dotted translation key.
    #[serde(default = "default_key_attribute")]
    pub key_attribute: String,
    /// Names the attribute that receives the translation instead of the text.
    #[serde(default = "default_target_attribute")]
    pub target_attribute: String,
    /// Marks elements that host a language selector.
    #[serde(default = "default_selector_attribute")]
    pub selector_attribute: String,
    /// Attribute used for input-style elements.
    #[serde(default = "default_placeholder_attribute")]
    pub placeholder_attribute: String,
    #[serde(default = "default_input_tags")]
    pub input_tags: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            key_attribute: default_key_attribute(),
            target_attribute: default_target_attribute(),
            selector_attribute: default_selector_attribute(),
            placeholder_attribute: default_placeholder_attribute(),
            input_tags: default_input_tags(),
        }
    }
}

/// Formatting helper config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// ISO 4217 currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Language code to full locale tag.
    #[serde(default = "default_locale_tags")]
    pub locales: BTreeMap<String, String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            locales: default_locale_tags(),
        }
    }
}

impl FormatConfig {
    /// Locale tag for `language`, or the bare code when none is configured.
    pub fn locale_tag(&self, language: &LanguageCode) -> String {
        self.locales
            .get(language.as_str())
            .cloned()
            .unwrap_or_else(|| language.to_string())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. The language section is
/// validated either way.
pub fn load(path: &str) -> Result<Config, PolyglotError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| PolyglotError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    parse(&content)
}

/// Parse and validate configuration text.
pub fn parse(content: &str) -> Result<Config, PolyglotError> {
    let config: Config = toml::from_str(content)
        .map_err(|e| PolyglotError::Config(format!("failed to parse config: {}", e)))?;

    config.languages.to_supported()?;
    if !config.source.url_template.contains("{lang}") && config.source.kind == SourceKind::Http {
        return Err(PolyglotError::Config(
            "source.url_template must contain a {lang} placeholder".to_string(),
        ));
    }

    Ok(config)
}
