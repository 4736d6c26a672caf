//! Pipeline log fan-out.
//!
//! Every entry is printed to stderr and broadcast to the `/api/logs` SSE
//! subscribers. Entries sent while nobody listens are dropped.
//!
//! Entries logged inside [`scoped`] carry a session id, and subscribers only
//! see the entries of their own session plus untagged ones.

use chrono::{DateTime, Utc};
use std::cell::RefCell;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Entries a slow subscriber may lag behind before it starts losing them.
const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl LogEntry {
    /// Entry tagged with the session of the current [`scoped`] call, if any.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            session: current_session(),
        }
    }

    pub fn for_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Whether a subscriber of `session` may see this entry.
    pub fn visible_to(&self, session: Option<&str>) -> bool {
        match &self.session {
            None => true,
            Some(own) => session == Some(own.as_str()),
        }
    }
}

thread_local! {
    static SESSION_SCOPE: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn current_session() -> Option<String> {
    SESSION_SCOPE.with(|s| s.borrow().clone())
}

struct ScopeGuard(Option<String>);

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let previous = self.0.take();
        SESSION_SCOPE.with(|s| *s.borrow_mut() = previous);
    }
}

/// Run `f` with every entry logged on this thread tagged with `session`.
pub fn scoped<T>(session: &str, f: impl FnOnce() -> T) -> T {
    let previous = SESSION_SCOPE.with(|s| s.borrow_mut().replace(session.to_string()));
    let _guard = ScopeGuard(previous);
    f()
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn log(&self, entry: LogEntry) {
        eprintln!("{} {}", entry.level.prefix(), entry.message);
        // no receivers is fine
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Error, msg));
}

/// Log on behalf of `session` outside a [`scoped`] call.
pub fn log_session(session: &str, level: LogLevel, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(level, msg).for_session(session));
}
