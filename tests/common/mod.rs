//! Fakes for the host surface, log sink and process runner.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use repomix_bridge::config::Settings;
use repomix_bridge::context::Context;
use repomix_bridge::error::{RepomixBridgeError, Result};
use repomix_bridge::host::{Host, LogSink, NoticeLevel, StatusItem};
use repomix_bridge::process::{InvocationSpec, OutputChunk, OutputStream, RunResult, Runner};

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryLog {
    text: Mutex<String>,
    pub clears: AtomicUsize,
}

impl MemoryLog {
    pub fn contents(&self) -> String {
        self.text.lock().unwrap().clone()
    }
}

impl LogSink for MemoryLog {
    fn append(&self, text: &str) {
        self.text.lock().unwrap().push_str(text);
    }

    fn clear(&self) {
        self.text.lock().unwrap().clear();
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PromptRecord {
    pub level: NoticeLevel,
    pub message: String,
    pub actions: Vec<String>,
}

/// Answers prompts from a script; an exhausted script dismisses.
#[derive(Default)]
pub struct FakeHost {
    answers: Mutex<VecDeque<Option<String>>>,
    pub prompts: Mutex<Vec<PromptRecord>>,
    pub notices: Mutex<Vec<(NoticeLevel, String)>>,
    pub opened: Mutex<Vec<PathBuf>>,
    pub settings_opened: Mutex<Vec<String>>,
    pub log_shows: AtomicUsize,
    pub status_shows: AtomicUsize,
    pub progress: Mutex<Vec<Option<String>>>,
}

impl FakeHost {
    pub fn answering(answers: &[Option<&str>]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.map(String::from)).collect()),
            ..Default::default()
        }
    }

    pub fn prompts(&self) -> Vec<PromptRecord> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }

    pub fn log_shows(&self) -> usize {
        self.log_shows.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Host for FakeHost {
    async fn prompt(
        &self,
        level: NoticeLevel,
        message: &str,
        _detail: Option<&str>,
        actions: &[&str],
    ) -> Option<String> {
        self.prompts.lock().unwrap().push(PromptRecord {
            level,
            message: message.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
        });
        self.answers.lock().unwrap().pop_front().flatten()
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }

    async fn open_document(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(RepomixBridgeError::OpenDocument {
                path: path.to_path_buf(),
                reason: "file not found".into(),
            });
        }
        self.opened.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn show_log(&self) {
        self.log_shows.fetch_add(1, Ordering::SeqCst);
    }

    async fn open_settings(&self, key: &str) {
        self.settings_opened.lock().unwrap().push(key.to_string());
    }

    fn set_progress(&self, title: Option<&str>) {
        self.progress.lock().unwrap().push(title.map(String::from));
    }

    fn show_status(&self, _item: &StatusItem) {
        self.status_shows.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub enum Script {
    Exit {
        chunks: Vec<OutputChunk>,
        code: i32,
    },
    LaunchFailure,
}

/// Replays a scripted run and records every invocation.
pub struct FakeRunner {
    script: Script,
    pub invocations: Mutex<Vec<InvocationSpec>>,
}

impl FakeRunner {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn exiting(code: i32, chunks: &[(OutputStream, &str)]) -> Self {
        Self::new(Script::Exit {
            chunks: chunks
                .iter()
                .map(|(stream, text)| OutputChunk {
                    stream: *stream,
                    text: text.to_string(),
                })
                .collect(),
            code,
        })
    }

    pub fn invocations(&self) -> Vec<InvocationSpec> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Runner for FakeRunner {
    async fn run(
        &self,
        spec: &InvocationSpec,
        on_chunk: &mut (dyn for<'c> FnMut(&'c OutputChunk) + Send),
    ) -> Result<RunResult> {
        self.invocations.lock().unwrap().push(spec.clone());
        match &self.script {
            Script::LaunchFailure => Err(RepomixBridgeError::Launch {
                tool: spec.tool().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
            Script::Exit { chunks, code } => {
                let mut result = RunResult::default();
                for chunk in chunks {
                    on_chunk(chunk);
                    result.push(chunk);
                }
                if *code == 0 {
                    Ok(result)
                } else {
                    Err(RepomixBridgeError::NonZeroExit {
                        tool: spec.tool().to_string(),
                        code: *code,
                    })
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub tmp: TempDir,
    pub ctx: Context,
    pub log: Arc<MemoryLog>,
    pub host: Arc<FakeHost>,
    pub runner: Arc<FakeRunner>,
}

impl Harness {
    pub fn new(host: FakeHost, runner: FakeRunner) -> Self {
        Self::with_settings(host, runner, Settings::default())
    }

    pub fn with_settings(host: FakeHost, runner: FakeRunner, settings: Settings) -> Self {
        let tmp = TempDir::new().unwrap();
        let log = Arc::new(MemoryLog::default());
        let host = Arc::new(host);
        let runner = Arc::new(runner);
        let ctx = Context::new(
            tmp.path(),
            settings,
            log.clone(),
            host.clone(),
            runner.clone(),
        );
        Self {
            tmp,
            ctx,
            log,
            host,
            runner,
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.tmp.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }
}
