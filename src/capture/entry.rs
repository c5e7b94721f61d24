//! Captured log entries.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::correlation::CorrelationKey;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    #[default]
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
    None,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Information => "information",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
            LogLevel::None => "none",
        };
        f.pad(s)
    }
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Information,
            tracing::Level::WARN => LogLevel::Warning,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

/// Numeric event id with an optional name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct EventId {
    pub id: u64,
    pub name: Option<String>,
}

impl EventId {
    pub fn new(id: u64) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// Structured, pre-formatting arguments of an entry.
pub type LogState = BTreeMap<String, serde_json::Value>;

/// Owned snapshot of an error attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// `Display` of the error itself.
    pub message: String,
    /// `Display` of each source, outermost first.
    pub sources: Vec<String>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sources: Vec::new(),
        }
    }

    /// Snapshot an error and its source chain.
    pub fn capture(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut sources = Vec::new();
        let mut next = error.source();
        while let Some(source) = next {
            sources.push(source.to_string());
            next = source.source();
        }
        Self {
            message: error.to_string(),
            sources,
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        for source in &self.sources {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

/// One captured log event. Immutable once buffered.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    message: String,
    level: LogLevel,
    event_id: EventId,
    state: LogState,
    error: Option<ErrorInfo>,
    correlation_key: CorrelationKey,
    category: String,
    timestamp: DateTime<Utc>,
}

impl LogEntry {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        message: String,
        level: LogLevel,
        event_id: EventId,
        state: LogState,
        error: Option<ErrorInfo>,
        correlation_key: CorrelationKey,
        category: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message,
            level,
            event_id,
            state,
            error,
            correlation_key,
            category,
            timestamp,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn state(&self) -> &LogState {
        &self.state
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn correlation_key(&self) -> CorrelationKey {
        self.correlation_key
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether this entry belongs to the `filter` category tree.
    ///
    /// `"app::db"` matches `"app::db"`, `"app::db::command"` and
    /// `"app::db.command"`, but not `"app::dbx"`.
    pub fn in_category(&self, filter: &str) -> bool {
        match self.category.strip_prefix(filter) {
            Some("") => true,
            Some(rest) => rest.starts_with("::") || rest.starts_with('.'),
            None => false,
        }
    }
}

/// `2019-06-19T11:55:23.723139500Z: Process started`
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.message
        )
    }
}

/// Number of entries in the `category` tree, or of all entries when `None`.
pub fn count_in_category(entries: &[LogEntry], category: Option<&str>) -> usize {
    match category {
        Some(filter) => entries.iter().filter(|e| e.in_category(filter)).count(),
        None => entries.len(),
    }
}
