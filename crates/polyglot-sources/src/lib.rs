//! # polyglot-sources
//!
//! Translation table sources for polyglot.

pub mod file;
pub mod http;
pub mod memory;

pub use file::DirectorySource;
pub use http::HttpSource;
pub use memory::StaticSource;

use polyglot_core::config::{SourceConfig, SourceKind};
use polyglot_core::{shellexpand, traits::TranslationSource, PolyglotError};
use std::time::Duration;

/// Build the source named by `config.kind`.
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn TranslationSource>, PolyglotError> {
    match config.kind {
        SourceKind::File => Ok(Box::new(DirectorySource::new(shellexpand(&config.dir)))),
        SourceKind::Http => Ok(Box::new(HttpSource::new(
            config.url_template.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)),
    }
}
