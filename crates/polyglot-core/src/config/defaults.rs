use std::collections::BTreeMap;

pub(super) fn default_data_dir() -> String {
    "~/.polyglot".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_supported() -> Vec<String> {
    vec!["es".into(), "en".into(), "pt".into()]
}
pub(super) fn default_fallback() -> String {
    "es".to_string()
}
pub(super) fn default_locales_dir() -> String {
    "locales".to_string()
}
pub(super) fn default_url_template() -> String {
    "https://localhost/locales/{lang}.json".to_string()
}
pub(super) fn default_timeout_secs() -> u64 {
    10
}
pub(super) fn default_store_backend() -> String {
    "sqlite".to_string()
}
pub(super) fn default_db_path() -> String {
    "~/.polyglot/data/polyglot.db".to_string()
}
pub(super) fn default_store_key() -> String {
    "language".to_string()
}
pub(super) fn default_request_param() -> String {
    "lang".to_string()
}
pub(super) fn default_key_attribute() -> String {
    "data-i18n".to_string()
}
pub(super) fn default_target_attribute() -> String {
    "data-i18n-attr".to_string()
}
pub(super) fn default_selector_attribute() -> String {
    "data-lang-selector".to_string()
}
pub(super) fn default_placeholder_attribute() -> String {
    "placeholder".to_string()
}
pub(super) fn default_input_tags() -> Vec<String> {
    vec!["input".into(), "textarea".into()]
}
pub(super) fn default_currency() -> String {
    "EUR".to_string()
}
pub(super) fn default_locale_tags() -> BTreeMap<String, String> {
    [("es", "es-ES"), ("en", "en-US"), ("pt", "pt-BR")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
