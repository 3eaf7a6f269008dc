//! Request context backed by a URL: reads and rewrites the language query
//! parameter without touching anything else in the address.

use polyglot_core::{traits::RequestContext, LanguageCode, PolyglotError};
use reqwest::Url;
use std::sync::Mutex;

/// The address the application was opened with.
#[derive(Debug)]
pub struct UrlContext {
    url: Mutex<Url>,
    param: String,
}

impl UrlContext {
    pub fn new(url: Url, param: impl Into<String>) -> Self {
        Self {
            url: Mutex::new(url),
            param: param.into(),
        }
    }

    pub fn parse(url: &str, param: impl Into<String>) -> Result<Self, PolyglotError> {
        let url = Url::parse(url)
            .map_err(|e| PolyglotError::Config(format!("invalid request url {url:?}: {e}")))?;
        Ok(Self::new(url, param))
    }

    /// Current address, including any rewrite.
    pub fn url(&self) -> Url {
        self.url.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl RequestContext for UrlContext {
    fn language_param(&self) -> Option<String> {
        let url = self.url.lock().unwrap_or_else(|e| e.into_inner());
        url.query_pairs()
            .find(|(k, _)| *k == self.param)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    }

    fn replace_language_param(&self, language: &LanguageCode) {
        let mut url = self.url.lock().unwrap_or_else(|e| e.into_inner());
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        match pairs.iter_mut().find(|(k, _)| *k == self.param) {
            Some(pair) => pair.1 = language.to_string(),
            None => pairs.push((self.param.clone(), language.to_string())),
        }
        pairs.retain({
            // Keep the first occurrence of the parameter only.
            let mut seen = false;
            let param = self.param.clone();
            move |(k, _)| {
                if *k != param {
                    return true;
                }
                !std::mem::replace(&mut seen, true)
            }
        });

        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> LanguageCode {
        LanguageCode::parse(raw).unwrap()
    }

    #[test]
    fn test_reads_language_param() {
        let ctx = UrlContext::parse("https://example.com/page?lang=pt&x=1", "lang").unwrap();
        assert_eq!(ctx.language_param().as_deref(), Some("pt"));

        let ctx = UrlContext::parse("https://example.com/page?x=1", "lang").unwrap();
        assert_eq!(ctx.language_param(), None);

        let ctx = UrlContext::parse("https://example.com/page?lang=", "lang").unwrap();
        assert_eq!(ctx.language_param(), None);
    }

    #[test]
    fn test_rewrite_preserves_other_params_and_fragment() {
        let ctx =
            UrlContext::parse("https://example.com/page?a=1&lang=pt&b=2#top", "lang").unwrap();
        ctx.replace_language_param(&code("en"));
        assert_eq!(
            ctx.url().as_str(),
            "https://example.com/page?a=1&lang=en&b=2#top"
        );
    }

    #[test]
    fn test_rewrite_appends_when_absent() {
        let ctx = UrlContext::parse("https://example.com/", "lang").unwrap();
        ctx.replace_language_param(&code("es"));
        assert_eq!(ctx.url().as_str(), "https://example.com/?lang=es");
        assert_eq!(ctx.language_param().as_deref(), Some("es"));
    }

    #[test]
    fn test_rewrite_collapses_duplicates() {
        let ctx = UrlContext::parse("https://example.com/?lang=pt&lang=fr", "lang").unwrap();
        ctx.replace_language_param(&code("en"));
        assert_eq!(ctx.url().as_str(), "https://example.com/?lang=en");
    }

    #[test]
    fn test_custom_param_name() {
        let ctx = UrlContext::parse("https://example.com/?idioma=en", "idioma").unwrap();
        assert_eq!(ctx.language_param().as_deref(), Some("en"));
    }
}
