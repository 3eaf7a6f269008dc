//! Localizer: owns the active language and its translation table.
//!
//! Includes: initial resolution, loading with a single fallback retry,
//! dotted-key lookup with placeholder interpolation, change notification,
//! and document synchronization after every successful change.

use polyglot_core::{
    config::DocumentConfig,
    event::LocalizerEvent,
    interpolate::{interpolate, Vars},
    resolve::{resolve_initial_language, Candidates, ResolvedFrom},
    table::{Lookup, TranslationNode, TranslationTable},
    traits::{DocumentSurface, PreferenceStore, RequestContext, TranslationSource},
    LanguageCode, PolyglotError, SupportedLanguages,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{broadcast, Mutex as AsyncMutex};
use tracing::{debug, info, warn};

use crate::document::{DocumentBinding, SyncReport};

/// Capacity of the event channel. Slow subscribers lag rather than block.
const EVENT_CAPACITY: usize = 64;

/// Result of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    /// A string: the interpolated leaf, or the key itself when missing.
    Text(String),
    /// A group or non-string value found at the key, returned as-is.
    Node(TranslationNode),
}

impl Translation {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Node(_) => None,
        }
    }

    /// Flatten to a string; structured values render as JSON.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Node(node) => node.to_string(),
        }
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Node(node) => fmt::Display::fmt(node, f),
        }
    }
}

/// Outcome of [`Localizer::change_language`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The requested language was already active; nothing was loaded.
    Unchanged(LanguageCode),
    /// A table was installed and the document re-synchronized.
    Changed {
        language: LanguageCode,
        report: SyncReport,
    },
}

struct LocalizerState {
    language: LanguageCode,
    table: Arc<TranslationTable>,
}

/// The localizer. Construct once and share by reference or `Arc`.
pub struct Localizer {
    supported: SupportedLanguages,
    source: Arc<dyn TranslationSource>,
    store: Arc<dyn PreferenceStore>,
    request: Option<Arc<dyn RequestContext>>,
    binding: DocumentBinding,
    state: RwLock<LocalizerState>,
    /// Generation of the most recently issued load request.
    generation: AtomicU64,
    /// Held from the generation check until the change event is sent.
    install: AsyncMutex<()>,
    events: broadcast::Sender<LocalizerEvent>,
}

impl Localizer {
    /// Create a localizer with the fallback language active and an empty table.
    pub fn new(
        supported: SupportedLanguages,
        source: Arc<dyn TranslationSource>,
        store: Arc<dyn PreferenceStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = LocalizerState {
            language: supported.fallback().clone(),
            table: Arc::new(TranslationTable::empty()),
        };
        Self {
            supported,
            source,
            store,
            request: None,
            binding: DocumentBinding::default(),
            state: RwLock::new(state),
            generation: AtomicU64::new(0),
            install: AsyncMutex::new(()),
            events,
        }
    }

    /// Attach the request context used for the URL override and URL sync.
    pub fn with_request_context(mut self, request: Arc<dyn RequestContext>) -> Self {
        self.request = Some(request);
        self
    }

    /// Use custom attribute names when synchronizing documents.
    pub fn with_document_config(mut self, config: DocumentConfig) -> Self {
        self.binding = DocumentBinding::new(config);
        self
    }

    /// Subscribe to language changes, load failures and missing keys.
    pub fn subscribe(&self) -> broadcast::Receiver<LocalizerEvent> {
        self.events.subscribe()
    }

    pub fn supported(&self) -> &SupportedLanguages {
        &self.supported
    }

    pub fn current_language(&self) -> LanguageCode {
        self.read_state().language.clone()
    }

    pub fn current_table(&self) -> Arc<TranslationTable> {
        Arc::clone(&self.read_state().table)
    }

    /// Gather every candidate, resolve the initial language and load it.
    ///
    /// Never fails: when even the fallback cannot be loaded the localizer
    /// keeps its empty table and lookups echo their keys.
    pub async fn start(&self, environment_locale: Option<&str>) -> LanguageCode {
        let (language, from) = self.resolve(environment_locale).await;
        info!("starting with language {language} (from {from:?})");

        if let Err(e) = self.load_language(language.as_str()).await {
            warn!("no translation table could be loaded, lookups will echo keys: {e}");
        }
        self.current_language()
    }

    /// Resolve the initial language from the request, the stored preference
    /// and the environment locale, without loading anything.
    pub async fn resolve(&self, environment_locale: Option<&str>) -> (LanguageCode, ResolvedFrom) {
        let url = self.request.as_ref().and_then(|r| r.language_param());
        let stored = match self.store.stored_language().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("could not read stored language preference: {e}");
                None
            }
        };

        let candidates = Candidates {
            url: url.as_deref(),
            stored: stored.as_deref(),
            environment: environment_locale,
        };
        resolve_initial_language(&candidates, &self.supported)
    }

    /// Load and install the table for `requested`.
    ///
    /// Unsupported codes are replaced by the fallback before loading. If the
    /// load fails and the code is not the fallback, the fallback is attempted
    /// exactly once. On success returns the language that was installed; on
    /// failure the previous language and table stay in place.
    ///
    /// Overlapping calls do not race: a result is only installed, persisted
    /// and announced if no newer request has been issued since, otherwise
    /// [`PolyglotError::Superseded`] is returned. A failure that lands after
    /// a newer request is neither reported nor retried.
    pub async fn load_language(&self, requested: &str) -> Result<LanguageCode, PolyglotError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let language = self.supported.coerce(requested);
        if language.as_str() != requested {
            debug!("'{requested}' is not supported, loading {language} instead");
        }

        let err = match self.fetch_and_install(&language, generation).await {
            Ok(()) => return Ok(language),
            Err(e @ PolyglotError::Superseded { .. }) => return Err(e),
            Err(e) => e,
        };
        if self.is_stale(generation) {
            debug!("load of {language} failed after a newer request was issued: {err}");
            return Err(PolyglotError::Superseded {
                language: language.to_string(),
            });
        }

        let fallback = self.supported.fallback().clone();
        let will_retry = language != fallback;
        self.report_load_failure(&language, &err, will_retry);
        if !will_retry {
            return Err(err);
        }

        match self.fetch_and_install(&fallback, generation).await {
            Ok(()) => Ok(fallback),
            Err(e @ PolyglotError::Superseded { .. }) => Err(e),
            Err(_) if self.is_stale(generation) => Err(PolyglotError::Superseded {
                language: fallback.to_string(),
            }),
            Err(e) => {
                self.report_load_failure(&fallback, &e, false);
                Err(e)
            }
        }
    }

    /// Load `requested` unless it is already active after coercion.
    /// Returns `None` when nothing had to be loaded.
    pub async fn ensure_language(
        &self,
        requested: &str,
    ) -> Result<Option<LanguageCode>, PolyglotError> {
        let target = self.supported.coerce(requested);
        if target == self.current_language() {
            debug!("language {target} already active, skipping load");
            return Ok(None);
        }
        self.load_language(requested).await.map(Some)
    }

    /// Caller-level guarded change: a no-op when `requested` (after
    /// coercion) is already active, otherwise load then re-sync `surface`.
    pub async fn change_language(
        &self,
        requested: &str,
        surface: &mut dyn DocumentSurface,
    ) -> Result<ChangeOutcome, PolyglotError> {
        match self.ensure_language(requested).await? {
            None => Ok(ChangeOutcome::Unchanged(self.supported.coerce(requested))),
            Some(language) => {
                let report = self.sync_document(surface);
                Ok(ChangeOutcome::Changed { language, report })
            }
        }
    }

    /// Push the current table into `surface`.
    pub fn sync_document(&self, surface: &mut dyn DocumentSurface) -> SyncReport {
        let (language, table) = {
            let state = self.read_state();
            (state.language.clone(), Arc::clone(&state.table))
        };
        self.binding.sync(surface, &language, &self.supported, |key| {
            self.lookup_in(&table, &language, key, &Vars::new())
                .into_text()
        })
    }

    /// Resolve `key` against the current table and interpolate `vars`.
    ///
    /// Never fails: a missing key is reported and returned unchanged.
    pub fn translate(&self, key: &str, vars: &Vars) -> Translation {
        let (language, table) = {
            let state = self.read_state();
            (state.language.clone(), Arc::clone(&state.table))
        };
        self.lookup_in(&table, &language, key, vars)
    }

    /// [`translate`](Self::translate) flattened to a string.
    pub fn text(&self, key: &str, vars: &Vars) -> String {
        self.translate(key, vars).into_text()
    }

    /// Shorthand for a lookup without replacements.
    pub fn t(&self, key: &str) -> String {
        self.text(key, &Vars::new())
    }

    fn lookup_in(
        &self,
        table: &TranslationTable,
        language: &LanguageCode,
        key: &str,
        vars: &Vars,
    ) -> Translation {
        match table.lookup(key) {
            Lookup::Text(template) => Translation::Text(interpolate(template, vars)),
            Lookup::Node(node) => Translation::Node(node.clone()),
            Lookup::Missing => {
                warn!("missing translation for '{key}' in {language}");
                let _ = self.events.send(LocalizerEvent::MissingKey {
                    language: language.clone(),
                    key: key.to_string(),
                });
                Translation::Text(key.to_string())
            }
        }
    }

    /// Fetch one table and install it if `generation` is still the newest.
    async fn fetch_and_install(
        &self,
        language: &LanguageCode,
        generation: u64,
    ) -> Result<(), PolyglotError> {
        let table = Arc::new(self.source.fetch(language).await?);

        // The swap, the stored preference, the URL and the event all belong
        // to one request; a newer request waits here until they are done.
        let _install = self.install.lock().await;
        if self.is_stale(generation) {
            debug!("discarding stale table for {language}");
            return Err(PolyglotError::Superseded {
                language: language.to_string(),
            });
        }
        {
            let mut state = self.write_state();
            state.language = language.clone();
            state.table = Arc::clone(&table);
        }

        info!(
            "installed {} translations from {} ({} strings)",
            language,
            self.source.name(),
            table.leaf_count()
        );

        if let Err(e) = self.store.store_language(language).await {
            warn!("failed to persist language preference {language}: {e}");
        }
        if let Some(ref request) = self.request {
            request.replace_language_param(language);
        }
        let _ = self.events.send(LocalizerEvent::LanguageChanged {
            language: language.clone(),
            table,
        });
        Ok(())
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn report_load_failure(&self, language: &LanguageCode, error: &PolyglotError, will_retry: bool) {
        if will_retry {
            warn!(
                "failed to load {language}: {error}; retrying with {}",
                self.supported.fallback()
            );
        } else {
            warn!("failed to load {language}: {error}");
        }
        let _ = self.events.send(LocalizerEvent::LoadFailed {
            language: language.clone(),
            error: error.to_string(),
            will_retry,
        });
    }

    // State is only ever replaced wholesale, so a poisoned lock still holds a
    // consistent language/table pair.
    fn read_state(&self) -> RwLockReadGuard<'_, LocalizerState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LocalizerState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests;
