//! HTTP translation source.
//!
//! Fetches `url_template` with `{lang}` replaced by the language code. Any
//! non-success status is a load failure, as is a body that is not a JSON
//! object.

use async_trait::async_trait;
use polyglot_core::{
    error::PolyglotError, language::LanguageCode, table::TranslationTable,
    traits::TranslationSource,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Translation source backed by an HTTP endpoint.
pub struct HttpSource {
    client: reqwest::Client,
    url_template: String,
}

impl HttpSource {
    /// Create a source with a per-request timeout.
    pub fn new(url_template: String, timeout: Duration) -> Result<Self, PolyglotError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PolyglotError::Source(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            url_template,
        })
    }

    /// Resolve the URL for one language.
    pub fn url_for(&self, language: &LanguageCode) -> String {
        self.url_template.replace("{lang}", language.as_str())
    }
}

#[async_trait]
impl TranslationSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, language: &LanguageCode) -> Result<TranslationTable, PolyglotError> {
        let url = self.url_for(language);
        let start = Instant::now();

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| PolyglotError::Source(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            warn!("translation fetch {url} returned {status}");
            return Err(PolyglotError::Source(format!("{url} returned {status}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| PolyglotError::Source(format!("failed to read body of {url}: {e}")))?;

        let table = TranslationTable::from_json_str(&body)?;
        debug!(
            "fetched {} ({} entries) in {}ms",
            url,
            table.len(),
            start.elapsed().as_millis()
        );
        Ok(table)
    }
}
