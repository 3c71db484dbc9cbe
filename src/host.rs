//! Capability surface of the editor hosting the bridge.
//!
//! The core never talks to a UI directly; it asks a [`Host`] to show
//! notices, open documents and reveal the log, and writes log text to a
//! [`LogSink`].

use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::Result;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// Append-only log panel.
pub trait LogSink: Send + Sync {
    /// Append raw text, exactly as received.
    fn append(&self, text: &str);

    fn append_line(&self, line: &str) {
        self.append(line);
        self.append("\n");
    }

    fn clear(&self);
}

/// UI operations the core needs from its host.
#[async_trait]
pub trait Host: Send + Sync {
    /// Show a non-modal notice with action buttons and wait for a pick.
    /// Returns `None` when the notice is dismissed without a selection.
    async fn prompt(
        &self,
        level: NoticeLevel,
        message: &str,
        detail: Option<&str>,
        actions: &[&str],
    ) -> Option<String>;

    /// Show a notice without waiting for it.
    fn notify(&self, level: NoticeLevel, message: &str);

    /// Open a document for editing. Resolves once the document is shown.
    async fn open_document(&self, path: &Path) -> Result<()>;

    /// Reveal the log panel.
    fn show_log(&self);

    /// Take the user to the setting named `key`.
    async fn open_settings(&self, key: &str);

    /// Start (`Some`) or finish (`None`) a progress indicator.
    fn set_progress(&self, title: Option<&str>);

    /// Reflect a status item's current visibility.
    fn show_status(&self, item: &StatusItem);
}

/// A quick-action affordance that may be shown for a limited time.
#[derive(Debug)]
pub struct StatusItem {
    pub text: String,
    pub tooltip: String,
    pub command: String,
    visible_until: Mutex<Option<(Instant, DateTime<Local>)>>,
}

impl StatusItem {
    pub fn new(text: &str, tooltip: &str, command: &str) -> Self {
        Self {
            text: text.to_string(),
            tooltip: tooltip.to_string(),
            command: command.to_string(),
            visible_until: Mutex::new(None),
        }
    }

    /// Make the item visible; it hides itself once `ttl` has elapsed.
    pub fn show_for(&self, ttl: Duration) {
        let until = Instant::now() + ttl;
        let wall = Local::now()
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        *self.visible_until.lock().unwrap_or_else(|e| e.into_inner()) = Some((until, wall));
    }

    pub fn hide(&self) {
        *self.visible_until.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible_until
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some_and(|(until, _)| Instant::now() < until)
    }

    /// Wall-clock time at which the item hides, if it is visible.
    pub fn expires_at(&self) -> Option<DateTime<Local>> {
        let guard = self.visible_until.lock().unwrap_or_else(|e| e.into_inner());
        match *guard {
            Some((until, wall)) if Instant::now() < until => Some(wall),
            _ => None,
        }
    }
}
