use thiserror::Error;

/// Top-level error type for polyglot.
///
/// Unsupported languages and missing keys are not errors: the former
/// are coerced to the fallback language and the latter echo the key back.
#[derive(Debug, Error)]
pub enum PolyglotError {
    /// Transport or status failure while fetching a translation table.
    #[error("source error: {0}")]
    Source(String),

    /// A translation table could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Preference store failure.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Document binding failure.
    #[error("document error: {0}")]
    Document(String),

    /// A newer language request was issued while this one was in flight.
    #[error("load of '{language}' superseded by a newer request")]
    Superseded { language: String },

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
