//! Events broadcast by a localizer to independent subscribers.

use std::sync::Arc;

use crate::language::LanguageCode;
use crate::table::TranslationTable;

/// Something observable happened inside a localizer.
#[derive(Debug, Clone)]
pub enum LocalizerEvent {
    /// A table was installed and is now current.
    LanguageChanged {
        language: LanguageCode,
        table: Arc<TranslationTable>,
    },
    /// Loading a language failed. `will_retry` is true when the fallback
    /// language is about to be attempted.
    LoadFailed {
        language: LanguageCode,
        error: String,
        will_retry: bool,
    },
    /// A lookup did not resolve and the key was echoed back.
    MissingKey { language: LanguageCode, key: String },
}

impl LocalizerEvent {
    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LanguageChanged { .. } => "language_changed",
            Self::LoadFailed { .. } => "load_failed",
            Self::MissingKey { .. } => "missing_key",
        }
    }

    pub fn language(&self) -> &LanguageCode {
        match self {
            Self::LanguageChanged { language, .. }
            | Self::LoadFailed { language, .. }
            | Self::MissingKey { language, .. } => language,
        }
    }
}
