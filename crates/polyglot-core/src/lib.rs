//! # polyglot-core
//!
//! Core types, traits, configuration, and error handling for polyglot.

pub mod config;
pub mod error;
pub mod event;
pub mod interpolate;
pub mod language;
pub mod resolve;
pub mod table;
pub mod traits;

pub use config::shellexpand;
pub use error::PolyglotError;
pub use language::{LanguageCode, SupportedLanguages};
pub use table::{TranslationNode, TranslationTable};
