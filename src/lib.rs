//! # polyglot
//!
//! Client-side localization: resolve the active language, load its
//! translation table, look keys up and keep a bound document in sync.

pub mod document;
pub mod format;
pub mod localizer;
pub mod request;

pub use document::{DocumentBinding, MemoryDocument, SyncReport};
pub use format::Formatter;
pub use localizer::{ChangeOutcome, Localizer, Translation};
pub use request::UrlContext;

pub use polyglot_core::{
    config, event::LocalizerEvent, interpolate::Vars, resolve::ResolvedFrom, LanguageCode,
    PolyglotError, SupportedLanguages, TranslationNode, TranslationTable,
};
