//! Initial language resolution.

use tracing::debug;

use crate::language::{LanguageCode, SupportedLanguages};

/// Where the resolved language came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    Url,
    Stored,
    Environment,
    Fallback,
}

/// Candidate values gathered from each collaborator before resolution.
#[derive(Debug, Clone, Default)]
pub struct Candidates<'a> {
    /// Explicit override from the request's query string.
    pub url: Option<&'a str>,
    /// Previously persisted user preference.
    pub stored: Option<&'a str>,
    /// Negotiated environment locale, e.g. `en-US`.
    pub environment: Option<&'a str>,
}

/// Pick the initial language: URL, then stored preference, then the
/// environment locale's primary subtag, then the fallback. Unsupported
/// candidates are skipped.
pub fn resolve_initial_language(
    candidates: &Candidates<'_>,
    supported: &SupportedLanguages,
) -> (LanguageCode, ResolvedFrom) {
    if let Some(code) = candidates.url.and_then(|raw| supported.get(raw)) {
        debug!("language resolved from url parameter: {code}");
        return (code, ResolvedFrom::Url);
    }
    if let Some(code) = candidates.stored.and_then(|raw| supported.get(raw)) {
        debug!("language resolved from stored preference: {code}");
        return (code, ResolvedFrom::Stored);
    }
    if let Some(code) = candidates
        .environment
        .and_then(LanguageCode::from_locale)
        .filter(|code| supported.contains(code))
    {
        debug!("language resolved from environment locale: {code}");
        return (code, ResolvedFrom::Environment);
    }

    let fallback = supported.fallback().clone();
    debug!("no usable language candidate, using fallback {fallback}");
    (fallback, ResolvedFrom::Fallback)
}
