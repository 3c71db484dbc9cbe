//! Terminal implementation of the host surface used by the binary.
//!
//! Notices and prompts go to stderr, answers are read from stdin. The log is
//! buffered in memory and mirrored live to stderr once it has been revealed.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::error::{RepomixBridgeError, Result};
use crate::host::{Host, LogSink, NoticeLevel, StatusItem};

/// In-memory log that streams to stderr once revealed.
#[derive(Debug, Default)]
pub struct TerminalLog {
    buffer: Mutex<String>,
    live: AtomicBool,
}

impl TerminalLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print everything logged so far and stream subsequent appends.
    pub fn reveal(&self) {
        let buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(buffer.as_bytes());
        let _ = err.flush();
        self.live.store(true, Ordering::SeqCst);
    }

    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl LogSink for TerminalLog {
    fn append(&self, text: &str) {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_str(text);
        if self.live.load(Ordering::SeqCst) {
            let mut err = std::io::stderr().lock();
            let _ = err.write_all(text.as_bytes());
            let _ = err.flush();
        }
    }

    fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

/// Prompts on stderr/stdin; opens documents in `$VISUAL` / `$EDITOR`.
pub struct TerminalHost {
    log: Arc<TerminalLog>,
    interactive: bool,
    settings_hint: PathBuf,
    stdin: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl TerminalHost {
    /// With `interactive` false every prompt is treated as dismissed.
    pub fn new(log: Arc<TerminalLog>, interactive: bool, settings_hint: &Path) -> Self {
        Self {
            log,
            interactive,
            settings_hint: settings_hint.to_path_buf(),
            stdin: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    async fn read_answer(&self) -> Option<String> {
        let mut lines = self.stdin.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_string()),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("failed to read answer from stdin: {e}");
                None
            }
        }
    }
}

/// Match an answer against the offered actions: a 1-based index or a
/// case-insensitive label.
pub fn match_answer(answer: &str, actions: &[&str]) -> Option<String> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| actions.get(i))
            .map(|a| a.to_string());
    }
    actions
        .iter()
        .find(|a| a.eq_ignore_ascii_case(answer))
        .map(|a| a.to_string())
}

#[async_trait]
impl Host for TerminalHost {
    async fn prompt(
        &self,
        level: NoticeLevel,
        message: &str,
        detail: Option<&str>,
        actions: &[&str],
    ) -> Option<String> {
        eprintln!("[{level}] {message}");
        if let Some(detail) = detail {
            eprintln!("        {detail}");
        }
        if !self.interactive || actions.is_empty() {
            return None;
        }

        for (i, action) in actions.iter().enumerate() {
            eprintln!("  {}) {}", i + 1, action);
        }
        loop {
            eprint!("> ");
            let _ = std::io::stderr().flush();
            // EOF or an empty line dismisses the notice.
            let answer = self.read_answer().await?;
            if answer.is_empty() {
                return None;
            }
            match match_answer(&answer, actions) {
                Some(choice) => return Some(choice),
                None => eprintln!("Pick 1-{} or press Enter to dismiss.", actions.len()),
            }
        }
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        eprintln!("[{level}] {message}");
    }

    async fn open_document(&self, path: &Path) -> Result<()> {
        let open_err = |reason: String| RepomixBridgeError::OpenDocument {
            path: path.to_path_buf(),
            reason,
        };

        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| open_err(e.to_string()))?;
        if !meta.is_file() {
            return Err(open_err("not a file".into()));
        }

        let editor = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .ok()
            .filter(|e| !e.trim().is_empty());

        match editor {
            Some(editor) => {
                let status = tokio::process::Command::new(&editor)
                    .arg(path)
                    .status()
                    .await
                    .map_err(|e| open_err(format!("could not start {editor}: {e}")))?;
                if !status.success() {
                    return Err(open_err(format!("{editor} exited with {status}")));
                }
            }
            None => {
                let contents = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| open_err(e.to_string()))?;
                println!("{contents}");
            }
        }
        Ok(())
    }

    fn show_log(&self) {
        self.log.reveal();
    }

    async fn open_settings(&self, key: &str) {
        eprintln!(
            "Set `{key}` in {} (or .repomix-bridge.yml in the workspace).",
            self.settings_hint.display()
        );
    }

    fn set_progress(&self, title: Option<&str>) {
        if let Some(title) = title {
            eprintln!("{title}...");
        }
    }

    fn show_status(&self, item: &StatusItem) {
        if let Some(until) = item.expires_at() {
            eprintln!(
                "{}: run `repomix-bridge {}` until {}",
                item.tooltip,
                item.command,
                until.format("%H:%M:%S")
            );
        }
    }
}
