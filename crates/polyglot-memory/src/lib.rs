//! # polyglot-memory
//!
//! Persistent language preference and diagnostics storage for polyglot.

pub mod diagnostics;
pub mod in_process;
pub mod store;

pub use diagnostics::DiagnosticsLog;
pub use in_process::InProcessStore;
pub use store::Store;

use polyglot_core::{config::StoreConfig, traits::PreferenceStore, PolyglotError};
use std::sync::Arc;

/// Build the preference store named by `config.backend`.
///
/// Returns the SQLite [`Store`] as well when that backend is selected, so the
/// caller can share its pool with a [`DiagnosticsLog`].
pub async fn from_config(
    config: &StoreConfig,
) -> Result<(Arc<dyn PreferenceStore>, Option<Store>), PolyglotError> {
    match config.backend.as_str() {
        "sqlite" => {
            let store = Store::new(config).await?;
            Ok((Arc::new(store.clone()), Some(store)))
        }
        "memory" => Ok((Arc::new(InProcessStore::new()), None)),
        other => Err(PolyglotError::Config(format!(
            "unsupported store backend: {other}"
        ))),
    }
}
