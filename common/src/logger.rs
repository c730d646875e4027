use std::sync::{Arc, Mutex};

/// The kind of a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogType {
    Success,
    Info,
    Warning,
    Error,
}

impl LogType {
    fn level(self) -> log::Level {
        match self {
            LogType::Success | LogType::Info => log::Level::Info,
            LogType::Warning => log::Level::Warn,
            LogType::Error => log::Level::Error,
        }
    }
}

/// Who a log entry is meant for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogRecipient {
    /// Shown to the person using the panel.
    User,
    /// Only written to the developer log.
    Developer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: LogType,
    pub recipient: LogRecipient,
    pub message: String,
    pub detail: Option<String>,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.message, detail),
            None => f.write_str(&self.message),
        }
    }
}

/// Receives the entries meant for the user.
///
/// Sinks are called from whichever task finished a request, so writes may interleave.
pub trait LogSink: Send + Sync {
    fn write(&self, entry: &LogEntry);
}

/// Logger used by the panel.
///
/// Everything goes to the `log` facade; user entries are also handed to the sinks.
#[derive(Clone, Default)]
pub struct AppLogger {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl AppLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink for user entries.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn log(&self, kind: LogType, recipient: LogRecipient, message: &str, detail: Option<&str>) {
        let entry = LogEntry {
            kind,
            recipient,
            message: message.to_string(),
            detail: detail.map(str::to_string),
        };

        log::log!(kind.level(), "[{:?}] {}", recipient, entry);

        if recipient == LogRecipient::User {
            for sink in &self.sinks {
                sink.write(&entry);
            }
        }
    }
}

/// Keeps every user entry in arrival order.
#[derive(Clone, Default)]
pub struct LogHistory(Arc<Mutex<Vec<LogEntry>>>);

impl LogHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the entries written so far.
    ///
    /// # Panics
    ///
    /// If the internally used mutex is poisoned.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.0.lock().unwrap().clone()
    }
}

impl LogSink for LogHistory {
    fn write(&self, entry: &LogEntry) {
        // A panicking writer must not silence later entries.
        let mut entries = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push(entry.clone());
    }
}

#[test]
fn test_user_entries_reach_sinks() {
    let history = LogHistory::new();
    let logger = AppLogger::new().with_sink(Arc::new(history.clone()));

    logger.log(LogType::Success, LogRecipient::User, "sent", None);
    logger.log(LogType::Error, LogRecipient::User, "failed", Some("timeout"));

    let entries = history.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, LogType::Success);
    assert_eq!(entries[0].detail, None);
    assert_eq!(entries[1].to_string(), "failed: timeout");
}

#[test]
fn test_developer_entries_skip_sinks() {
    let history = LogHistory::new();
    let logger = AppLogger::new().with_sink(Arc::new(history.clone()));

    logger.log(LogType::Info, LogRecipient::Developer, "window opened", None);

    assert!(history.entries().is_empty());
}
