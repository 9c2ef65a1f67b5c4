//! Change log of parameter mutations
//!
//! Every mutation of a registry appends a [`LogEntry`] to its [`ChangeLog`]. The log
//! is append-only; it can be rendered as text or filtered with a [`LogFilter`].

use crate::parameters::timespec::{parse_time_spec, TimeSpecError};
use crate::parameters::value::Value;
use chrono::{DateTime, Utc};
use std::fmt;

/// Kind of operation recorded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Parameter seeded during initialization
    Init,

    /// Parameter changed (or introduced) through `set`
    Set,

    /// Parameter introduced or changed through `add`
    Add,

    /// Parameter or flag written through `silent_update`
    SilentUpdate,

    /// Parameter removed
    Delete,

    /// Non-fatal policy warning (strict skip, type mismatch, ignored name)
    Warning,
}

impl OpKind {
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::Init => "init",
            OpKind::Set => "set",
            OpKind::Add => "add",
            OpKind::SilentUpdate => "silent_update",
            OpKind::Delete => "delete",
            OpKind::Warning => "warning",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single log record
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// When the entry was posted
    pub time: DateTime<Utc>,

    pub kind: OpKind,

    /// Parameter or flag the entry concerns
    pub name: String,

    /// Value before the operation, if there was one
    pub old: Option<Value>,

    /// Value after the operation, if there is one
    pub new: Option<Value>,

    /// Human-readable description
    pub detail: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  --  [{}] {}",
            self.time.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.kind,
            self.detail
        )
    }
}

/// Append-only sequence of log entries
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    entries: Vec<LogEntry>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the current time
    pub fn post(
        &mut self,
        kind: OpKind,
        name: &str,
        old: Option<Value>,
        new: Option<Value>,
        detail: String,
    ) {
        self.entries.push(LogEntry {
            time: Utc::now(),
            kind,
            name: name.to_string(),
            old,
            new,
            detail,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Entries matching every criterion of `filter`, in posting order
    pub fn query(&self, filter: &LogFilter) -> Vec<&LogEntry> {
        self.entries.iter().filter(|entry| filter.matches(entry)).collect()
    }

    /// Render the whole log as text
    pub fn render(&self) -> String {
        let mut s = String::from("Log\n---\n");
        for entry in &self.entries {
            s.push_str(&entry.to_string());
            s.push('\n');
        }
        s
    }
}

/// Criteria for selecting log entries
///
/// Unset criteria match everything; set criteria must all match.
///
/// # Examples
///
/// ```
/// use param_track::parameters::{LogFilter, OpKind};
///
/// let filter = LogFilter::new().name("gain").kind(OpKind::Set);
/// let recent = LogFilter::new().since_spec("now-1h").unwrap();
/// # let _ = (filter, recent);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    pub name: Option<String>,
    pub kind: Option<OpKind>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn kind(mut self, kind: OpKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Only entries posted at or after `time`
    pub fn since(mut self, time: DateTime<Utc>) -> Self {
        self.since = Some(time);
        self
    }

    /// Only entries posted at or before `time`
    pub fn until(mut self, time: DateTime<Utc>) -> Self {
        self.until = Some(time);
        self
    }

    /// As [`LogFilter::since`], with the time given as a time specification
    pub fn since_spec(self, spec: &str) -> Result<Self, TimeSpecError> {
        Ok(self.since(parse_time_spec(spec)?))
    }

    /// As [`LogFilter::until`], with the time given as a time specification
    pub fn until_spec(self, spec: &str) -> Result<Self, TimeSpecError> {
        Ok(self.until(parse_time_spec(spec)?))
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.name.as_deref().map_or(true, |name| entry.name == name)
            && self.kind.map_or(true, |kind| entry.kind == kind)
            && self.since.map_or(true, |since| entry.time >= since)
            && self.until.map_or(true, |until| entry.time <= until)
    }
}
