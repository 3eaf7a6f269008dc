use super::*;
use crate::document::MemoryDocument;
use crate::request::UrlContext;
use async_trait::async_trait;
use polyglot_core::traits::Element;
use polyglot_memory::InProcessStore;
use polyglot_sources::StaticSource;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;
use tokio::sync::Notify;

const ES: &str = r#"{"nav": {"home": "Inicio"}, "greeting": "Hola, {name}"}"#;
const EN: &str = r#"{"nav": {"home": "Home"}, "greeting": "Hello, {name}"}"#;
const PT: &str = r#"{"nav": {"home": "Início"}, "greeting": "Olá, {name}"}"#;

/// Serves canned JSON per language and records every fetch. Languages
/// without a table fail like an unreachable server.
#[derive(Default)]
struct FakeSource {
    tables: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
    gate: Option<(String, Arc<Notify>)>,
}

impl FakeSource {
    fn new(tables: &[(&str, &str)]) -> Self {
        Self {
            tables: tables
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    /// Hold fetches of `language` until `gate` is notified.
    fn gated(mut self, language: &str, gate: Arc<Notify>) -> Self {
        self.gate = Some((language.to_string(), gate));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch(&self, language: &LanguageCode) -> Result<TranslationTable, PolyglotError> {
        self.calls.lock().unwrap().push(language.to_string());
        if let Some((gated, gate)) = &self.gate {
            if gated == language.as_str() {
                gate.notified().await;
            }
        }
        match self.tables.get(language.as_str()) {
            Some(text) => TranslationTable::from_json_str(text),
            None => Err(PolyglotError::Source(format!("{language}.json returned 503"))),
        }
    }
}

/// Preference store whose writes always fail.
struct BrokenStore;

#[async_trait]
impl PreferenceStore for BrokenStore {
    async fn stored_language(&self) -> Result<Option<String>, PolyglotError> {
        Err(PolyglotError::Store("disk full".to_string()))
    }

    async fn store_language(&self, _language: &LanguageCode) -> Result<(), PolyglotError> {
        Err(PolyglotError::Store("disk full".to_string()))
    }
}

/// Preference store that parks the write of one language until released.
struct GatedStore {
    value: Mutex<Option<String>>,
    gated: String,
    entered: AtomicBool,
    gate: Notify,
}

impl GatedStore {
    fn new(gated: &str) -> Self {
        Self {
            value: Mutex::new(None),
            gated: gated.to_string(),
            entered: AtomicBool::new(false),
            gate: Notify::new(),
        }
    }
}

#[async_trait]
impl PreferenceStore for GatedStore {
    async fn stored_language(&self) -> Result<Option<String>, PolyglotError> {
        Ok(self.value.lock().unwrap().clone())
    }

    async fn store_language(&self, language: &LanguageCode) -> Result<(), PolyglotError> {
        if language.as_str() == self.gated {
            self.entered.store(true, Ordering::SeqCst);
            self.gate.notified().await;
        }
        *self.value.lock().unwrap() = Some(language.to_string());
        Ok(())
    }
}

fn langs() -> SupportedLanguages {
    SupportedLanguages::new(["es", "en", "pt"], "es").unwrap()
}

fn localizer(source: Arc<FakeSource>, store: Arc<InProcessStore>) -> Localizer {
    Localizer::new(langs(), source, store)
}

fn all_tables() -> Arc<FakeSource> {
    Arc::new(FakeSource::new(&[("es", ES), ("en", EN), ("pt", PT)]))
}

fn drain(rx: &mut broadcast::Receiver<LocalizerEvent>) -> Vec<LocalizerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

async fn with_table(value: serde_json::Value) -> Localizer {
    let es = LanguageCode::parse("es").unwrap();
    let source = StaticSource::new().with_json(es, &value.to_string()).unwrap();
    let l = Localizer::new(langs(), Arc::new(source), Arc::new(InProcessStore::new()));
    l.load_language("es").await.unwrap();
    l
}

// --- translate ---

#[tokio::test]
async fn test_translate_interpolates_nested_leaf() {
    let l = with_table(json!({"a": {"b": {"c": "hello {name}"}}})).await;
    assert_eq!(
        l.translate("a.b.c", &Vars::from([("name", "Sam")])),
        Translation::Text("hello Sam".to_string())
    );
    assert_eq!(l.text("a.b.c", &Vars::new()), "hello {name}");
}

#[tokio::test]
async fn test_translate_missing_key_echoes_and_reports() {
    let l = with_table(json!({"a": {"b": 1}})).await;
    let mut rx = l.subscribe();

    assert_eq!(l.t("a.x"), "a.x");

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    match &events[0] {
        LocalizerEvent::MissingKey { language, key } => {
            assert_eq!(language.as_str(), "es");
            assert_eq!(key, "a.x");
        }
        other => panic!("expected MissingKey, got {other:?}"),
    }
}

#[tokio::test]
async fn test_translate_through_leaf_is_missing() {
    let l = with_table(json!({"a": {"b": "leaf"}})).await;
    assert_eq!(l.t("a.b.c"), "a.b.c");
}

#[tokio::test]
async fn test_translate_returns_group_as_is() {
    let l = with_table(json!({"a": {"b": {"c": 1}}})).await;
    match l.translate("a.b", &Vars::new()) {
        Translation::Node(node) => assert_eq!(node.to_json(), json!({"c": 1})),
        other => panic!("expected a node, got {other:?}"),
    }
}

#[tokio::test]
async fn test_translate_before_any_load_echoes_key() {
    let l = localizer(all_tables(), Arc::new(InProcessStore::new()));
    assert_eq!(l.t("nav.home"), "nav.home");
    assert_eq!(l.current_language().as_str(), "es");
    assert!(l.current_table().is_empty());
}

// --- load_language ---

#[tokio::test]
async fn test_load_installs_persists_and_notifies() {
    let store = Arc::new(InProcessStore::new());
    let request = Arc::new(UrlContext::parse("https://example.com/?lang=es", "lang").unwrap());
    let l = localizer(all_tables(), store.clone()).with_request_context(request.clone());
    let mut rx = l.subscribe();

    let installed = l.load_language("pt").await.unwrap();

    assert_eq!(installed.as_str(), "pt");
    assert_eq!(l.current_language().as_str(), "pt");
    assert_eq!(l.t("nav.home"), "Início");
    assert_eq!(store.stored_language().await.unwrap().as_deref(), Some("pt"));
    assert_eq!(request.url().as_str(), "https://example.com/?lang=pt");

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    match &events[0] {
        LocalizerEvent::LanguageChanged { language, table } => {
            assert_eq!(language.as_str(), "pt");
            assert_eq!(table.leaf_count(), 2);
        }
        other => panic!("expected LanguageChanged, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unsupported_language_loads_fallback() {
    let source = all_tables();
    let l = localizer(source.clone(), Arc::new(InProcessStore::new()));

    let installed = l.load_language("xx").await.unwrap();

    assert_eq!(installed.as_str(), "es");
    assert_eq!(l.current_language().as_str(), "es");
    assert_eq!(source.calls(), vec!["es"]);
}

#[tokio::test]
async fn test_failure_retries_fallback_exactly_once() {
    let source = Arc::new(FakeSource::new(&[("es", ES)]));
    let l = localizer(source.clone(), Arc::new(InProcessStore::new()));
    let mut rx = l.subscribe();

    let installed = l.load_language("en").await.unwrap();

    assert_eq!(installed.as_str(), "es");
    assert_eq!(source.calls(), vec!["en", "es"]);
    assert_eq!(l.t("nav.home"), "Inicio");

    let kinds: Vec<&str> = drain(&mut rx).iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["load_failed", "language_changed"]);
}

#[tokio::test]
async fn test_double_failure_leaves_state_unchanged() {
    let source = Arc::new(FakeSource::new(&[("pt", PT)]));
    let store = Arc::new(InProcessStore::new());
    let l = localizer(source.clone(), store.clone());
    l.load_language("pt").await.unwrap();
    let before = l.current_table();

    let err = l.load_language("en").await.unwrap_err();

    assert!(matches!(err, PolyglotError::Source(_)));
    assert_eq!(source.calls(), vec!["pt", "en", "es"]);
    assert_eq!(l.current_language().as_str(), "pt");
    assert!(Arc::ptr_eq(&before, &l.current_table()));
    assert_eq!(store.stored_language().await.unwrap().as_deref(), Some("pt"));
}

#[tokio::test]
async fn test_fallback_failure_is_not_retried() {
    let source = Arc::new(FakeSource::new(&[]));
    let l = localizer(source.clone(), Arc::new(InProcessStore::new()));
    let mut rx = l.subscribe();

    assert!(l.load_language("es").await.is_err());
    assert_eq!(source.calls(), vec!["es"]);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        LocalizerEvent::LoadFailed {
            will_retry: false,
            ..
        }
    ));
}

#[tokio::test]
async fn test_parse_failure_counts_as_load_failure() {
    let source = Arc::new(FakeSource::new(&[("en", "[\"not\", \"a table\"]"), ("es", ES)]));
    let l = localizer(source.clone(), Arc::new(InProcessStore::new()));
    assert_eq!(l.load_language("en").await.unwrap().as_str(), "es");
    assert_eq!(source.calls(), vec!["en", "es"]);
}

#[tokio::test]
async fn test_store_failure_does_not_undo_install() {
    let l = Localizer::new(langs(), all_tables(), Arc::new(BrokenStore));
    assert_eq!(l.load_language("en").await.unwrap().as_str(), "en");
    assert_eq!(l.t("nav.home"), "Home");
}

#[tokio::test]
async fn test_stale_load_is_discarded() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(
        FakeSource::new(&[("es", ES), ("en", EN), ("pt", PT)]).gated("en", gate.clone()),
    );
    let l = Arc::new(localizer(source.clone(), Arc::new(InProcessStore::new())));

    let slow = {
        let l = Arc::clone(&l);
        tokio::spawn(async move { l.load_language("en").await })
    };
    while source.calls().is_empty() {
        tokio::task::yield_now().await;
    }

    assert_eq!(l.load_language("pt").await.unwrap().as_str(), "pt");
    gate.notify_one();

    let err = slow.await.unwrap().unwrap_err();
    assert!(matches!(err, PolyglotError::Superseded { .. }));
    assert_eq!(l.current_language().as_str(), "pt");
    assert_eq!(l.t("nav.home"), "Início");
}

#[tokio::test]
async fn test_stale_failure_is_neither_reported_nor_retried() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(FakeSource::new(&[("es", ES), ("pt", PT)]).gated("en", gate.clone()));
    let l = Arc::new(localizer(source.clone(), Arc::new(InProcessStore::new())));
    let mut rx = l.subscribe();

    let slow = {
        let l = Arc::clone(&l);
        tokio::spawn(async move { l.load_language("en").await })
    };
    while source.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    l.load_language("pt").await.unwrap();
    gate.notify_one();

    let err = slow.await.unwrap().unwrap_err();
    assert!(matches!(err, PolyglotError::Superseded { .. }));
    assert_eq!(source.calls(), vec!["en", "pt"]);
    assert_eq!(l.current_language().as_str(), "pt");

    let kinds: Vec<&str> = drain(&mut rx).iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["language_changed"]);
}

#[tokio::test]
async fn test_newer_request_side_effects_win_over_slow_persist() {
    let source = all_tables();
    let store = Arc::new(GatedStore::new("en"));
    let request = Arc::new(UrlContext::parse("https://example.com/?lang=es", "lang").unwrap());
    let l = Arc::new(
        Localizer::new(langs(), source.clone(), store.clone())
            .with_request_context(request.clone()),
    );
    let mut rx = l.subscribe();

    let slow = {
        let l = Arc::clone(&l);
        tokio::spawn(async move { l.load_language("en").await })
    };
    while !store.entered.load(Ordering::SeqCst) {
        tokio::task::yield_now().await;
    }
    let fast = {
        let l = Arc::clone(&l);
        tokio::spawn(async move { l.load_language("pt").await })
    };
    while !source.calls().iter().any(|c| c == "pt") {
        tokio::task::yield_now().await;
    }
    store.gate.notify_one();

    assert_eq!(slow.await.unwrap().unwrap().as_str(), "en");
    assert_eq!(fast.await.unwrap().unwrap().as_str(), "pt");

    assert_eq!(l.current_language().as_str(), "pt");
    assert_eq!(store.stored_language().await.unwrap().as_deref(), Some("pt"));
    assert_eq!(request.url().as_str(), "https://example.com/?lang=pt");
    let changed: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            LocalizerEvent::LanguageChanged { language, .. } => Some(language.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(changed, vec!["en", "pt"]);
}

// --- start / resolution ---

#[tokio::test]
async fn test_start_prefers_url_over_stored() {
    let request = Arc::new(UrlContext::parse("https://example.com/?lang=en", "lang").unwrap());
    let l = localizer(all_tables(), Arc::new(InProcessStore::seeded("pt")))
        .with_request_context(request);
    assert_eq!(l.start(Some("es-ES")).await.as_str(), "en");
}

#[tokio::test]
async fn test_start_skips_unsupported_url() {
    let request = Arc::new(UrlContext::parse("https://example.com/?lang=fr", "lang").unwrap());
    let l = localizer(all_tables(), Arc::new(InProcessStore::seeded("en")))
        .with_request_context(request.clone());
    assert_eq!(l.start(None).await.as_str(), "en");
    assert_eq!(request.url().as_str(), "https://example.com/?lang=en");
}

#[tokio::test]
async fn test_start_uses_environment_locale() {
    let l = localizer(all_tables(), Arc::new(InProcessStore::new()));
    assert_eq!(l.start(Some("pt-BR")).await.as_str(), "pt");
}

#[tokio::test]
async fn test_start_survives_unreadable_store() {
    let l = Localizer::new(langs(), all_tables(), Arc::new(BrokenStore));
    assert_eq!(l.start(Some("en-US")).await.as_str(), "en");
}

#[tokio::test]
async fn test_start_with_nothing_loadable_echoes_keys() {
    let l = localizer(Arc::new(FakeSource::new(&[])), Arc::new(InProcessStore::new()));
    assert_eq!(l.start(Some("en-US")).await.as_str(), "es");
    assert_eq!(l.t("nav.home"), "nav.home");
}

#[tokio::test]
async fn test_preference_round_trip_across_restart() {
    let store = Arc::new(InProcessStore::new());
    let first = localizer(all_tables(), store.clone());
    first.start(None).await;
    first.load_language("pt").await.unwrap();

    let second = localizer(all_tables(), store.clone());
    let (resolved, from) = second.resolve(Some("en-US")).await;
    assert_eq!(resolved.as_str(), "pt");
    assert_eq!(from, ResolvedFrom::Stored);
}

// --- change_language / documents ---

fn page() -> MemoryDocument {
    MemoryDocument::new(vec![
        Element::new("a").with_attribute("data-i18n", "nav.home"),
        Element::new("nav").with_attribute("data-lang-selector", ""),
    ])
}

#[tokio::test]
async fn test_change_language_is_noop_when_active() {
    let source = all_tables();
    let l = localizer(source.clone(), Arc::new(InProcessStore::new()));
    l.load_language("en").await.unwrap();
    let mut doc = page();

    let outcome = l.change_language("EN", &mut doc).await.unwrap();

    assert!(matches!(outcome, ChangeOutcome::Unchanged(ref c) if c.as_str() == "en"));
    assert_eq!(source.calls(), vec!["en"]);
    assert!(doc.lang.is_empty());
}

#[tokio::test]
async fn test_ensure_language_loads_only_when_needed() {
    let source = all_tables();
    let l = localizer(source.clone(), Arc::new(InProcessStore::new()));
    l.load_language("en").await.unwrap();

    assert_eq!(l.ensure_language("EN").await.unwrap(), None);
    assert_eq!(source.calls(), vec!["en"]);

    let loaded = l.ensure_language("pt").await.unwrap();
    assert_eq!(loaded.map(|c| c.to_string()).as_deref(), Some("pt"));
    assert_eq!(source.calls(), vec!["en", "pt"]);
}

#[tokio::test]
async fn test_change_language_loads_and_syncs() {
    let l = localizer(all_tables(), Arc::new(InProcessStore::new()));
    l.load_language("es").await.unwrap();
    let mut doc = page();

    let outcome = l.change_language("pt", &mut doc).await.unwrap();

    match outcome {
        ChangeOutcome::Changed { language, report } => {
            assert_eq!(language.as_str(), "pt");
            assert_eq!(report.translated, 1);
            assert_eq!(report.selectors, 1);
        }
        other => panic!("expected Changed, got {other:?}"),
    }
    assert_eq!(doc.lang, "pt");
    assert_eq!(doc.elements[0].text, "Início");
    assert_eq!(
        doc.elements[1].attribute("data-current-language"),
        Some("pt")
    );
}

#[tokio::test]
async fn test_change_to_unsupported_when_fallback_active_is_noop() {
    let source = all_tables();
    let l = localizer(source.clone(), Arc::new(InProcessStore::new()));
    l.load_language("es").await.unwrap();
    let mut doc = page();

    let outcome = l.change_language("de", &mut doc).await.unwrap();
    assert!(matches!(outcome, ChangeOutcome::Unchanged(_)));
    assert_eq!(source.calls(), vec!["es"]);
}

#[tokio::test]
async fn test_failed_change_leaves_document_untouched() {
    let source = Arc::new(FakeSource::new(&[("en", EN)]));
    let l = localizer(source, Arc::new(InProcessStore::new()));
    l.load_language("en").await.unwrap();
    let mut doc = page();
    l.sync_document(&mut doc);
    let before = doc.clone();

    assert!(l.change_language("pt", &mut doc).await.is_err());
    assert_eq!(doc, before);
    assert_eq!(doc.elements[0].text, "Home");
}

#[tokio::test]
async fn test_custom_document_attributes() {
    let config = DocumentConfig {
        key_attribute: "data-t".to_string(),
        ..DocumentConfig::default()
    };
    let l = localizer(all_tables(), Arc::new(InProcessStore::new())).with_document_config(config);
    l.load_language("en").await.unwrap();

    let mut doc = MemoryDocument::new(vec![
        Element::new("span").with_attribute("data-t", "nav.home"),
        Element::new("span").with_attribute("data-i18n", "nav.home"),
    ]);
    let report = l.sync_document(&mut doc);

    assert_eq!(report.translated, 1);
    assert_eq!(doc.elements[0].text, "Home");
    assert!(doc.elements[1].text.is_empty());
}
