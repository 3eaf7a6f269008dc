//! Diagnostics log: records load failures and missing keys reported by a
//! localizer so they can be reviewed later.

use polyglot_core::{error::PolyglotError, event::LocalizerEvent};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Kind of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    LoadFailed,
    MissingKey,
}

impl DiagnosticKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::LoadFailed => "load_failed",
            Self::MissingKey => "missing_key",
        }
    }
}

/// A missing key and how often it was looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKeyCount {
    pub language: String,
    pub key: String,
    pub count: i64,
}

/// A recorded load failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub language: String,
    pub error: String,
    pub created_at: String,
}

/// Diagnostics log backed by SQLite.
#[derive(Clone)]
pub struct DiagnosticsLog {
    pool: SqlitePool,
}

impl DiagnosticsLog {
    /// Create a new log sharing the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record one event. Language changes are not diagnostics and are ignored.
    pub async fn record(&self, event: &LocalizerEvent) -> Result<(), PolyglotError> {
        let (kind, subject, detail) = match event {
            LocalizerEvent::LoadFailed { error, .. } => {
                (DiagnosticKind::LoadFailed, String::new(), Some(error.as_str()))
            }
            LocalizerEvent::MissingKey { key, .. } => (DiagnosticKind::MissingKey, key.clone(), None),
            LocalizerEvent::LanguageChanged { .. } => return Ok(()),
        };

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO diagnostics (id, kind, language, subject, detail) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(kind.as_str())
        .bind(event.language().as_str())
        .bind(&subject)
        .bind(detail)
        .execute(&self.pool)
        .await
        .map_err(|e| PolyglotError::Store(format!("diagnostics write failed: {e}")))?;

        debug!(
            "diagnostic: {} [{}] {}",
            kind.as_str(),
            event.language(),
            truncate(&subject, 80)
        );

        Ok(())
    }

    /// Most frequently missing keys, busiest first.
    pub async fn top_missing_keys(&self, limit: i64) -> Result<Vec<MissingKeyCount>, PolyglotError> {
        let rows: Vec<(String, String, i64)> = sqlx::query_as(
            "SELECT language, subject, COUNT(*) AS n FROM diagnostics \
             WHERE kind = 'missing_key' \
             GROUP BY language, subject ORDER BY n DESC, subject ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PolyglotError::Store(format!("query failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(language, key, count)| MissingKeyCount {
                language,
                key,
                count,
            })
            .collect())
    }

    /// Most recent load failures, newest first.
    pub async fn recent_load_failures(&self, limit: i64) -> Result<Vec<LoadFailure>, PolyglotError> {
        let rows: Vec<(String, Option<String>, String)> = sqlx::query_as(
            "SELECT language, detail, created_at FROM diagnostics \
             WHERE kind = 'load_failed' ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PolyglotError::Store(format!("query failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(language, error, created_at)| LoadFailure {
                language,
                error: error.unwrap_or_default(),
                created_at,
            })
            .collect())
    }

    /// Drain `events` into the log until the sender side is dropped.
    pub async fn run(self, mut events: broadcast::Receiver<LocalizerEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = self.record(&event).await {
                        warn!("failed to record diagnostic: {e}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("diagnostics log lagged, {skipped} events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
