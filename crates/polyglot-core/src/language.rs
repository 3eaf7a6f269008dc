//! Language codes and the fixed set a localizer supports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PolyglotError;

/// A short, lowercase primary language subtag such as `es` or `en`.
///
/// Construction normalizes case and surrounding whitespace; membership in a
/// particular supported set is checked by [`SupportedLanguages`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse a bare language code. Returns `None` for anything that is not
    /// 2 to 8 ASCII letters.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_lowercase();
        if (2..=8).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_lowercase()) {
            Some(Self(code))
        } else {
            None
        }
    }

    /// Reduce a full locale (`en-US`, `pt_BR.UTF-8`) to its primary subtag.
    pub fn from_locale(locale: &str) -> Option<Self> {
        let primary = locale.trim().split(['-', '_', '.', '@']).next()?;
        Self::parse(primary)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for LanguageCode {
    type Err = PolyglotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| PolyglotError::Config(format!("invalid language code: {s:?}")))
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = PolyglotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

/// Ordered set of supported languages plus the fallback used for anything
/// outside it. Fixed once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLanguages {
    codes: Vec<LanguageCode>,
    fallback: LanguageCode,
}

impl SupportedLanguages {
    /// Build the set, keeping first-seen order and dropping duplicates.
    ///
    /// Fails when a code is malformed, the list is empty, or the fallback is
    /// not one of the supported codes.
    pub fn new<I, S>(codes: I, fallback: &str) -> Result<Self, PolyglotError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<LanguageCode> = Vec::new();
        for raw in codes {
            let code: LanguageCode = raw.as_ref().parse()?;
            if !parsed.contains(&code) {
                parsed.push(code);
            }
        }
        if parsed.is_empty() {
            return Err(PolyglotError::Config(
                "at least one supported language is required".to_string(),
            ));
        }

        let fallback: LanguageCode = fallback.parse()?;
        if !parsed.contains(&fallback) {
            return Err(PolyglotError::Config(format!(
                "fallback language '{fallback}' is not in the supported list"
            )));
        }

        Ok(Self {
            codes: parsed,
            fallback,
        })
    }

    /// Look up `raw` in the set. `None` when malformed or unsupported.
    pub fn get(&self, raw: &str) -> Option<LanguageCode> {
        let code = LanguageCode::parse(raw)?;
        self.contains(&code).then_some(code)
    }

    pub fn contains(&self, code: &LanguageCode) -> bool {
        self.codes.contains(code)
    }

    /// Map any input onto the set, substituting the fallback for unknowns.
    pub fn coerce(&self, raw: &str) -> LanguageCode {
        self.get(raw).unwrap_or_else(|| self.fallback.clone())
    }

    pub fn fallback(&self) -> &LanguageCode {
        &self.fallback
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageCode> {
        self.codes.iter()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for SupportedLanguages {
    fn default() -> Self {
        let codes = ["es", "en", "pt"].map(|c| LanguageCode(c.to_string()));
        Self {
            fallback: codes[0].clone(),
            codes: codes.to_vec(),
        }
    }
}
