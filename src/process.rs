//! Spawns external tools and streams their output.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::error::{RepomixBridgeError, Result};

const READ_BUF_SIZE: usize = 8 * 1024;

/// Which pipe a chunk of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// A piece of child output, delivered as soon as it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    pub stream: OutputStream,
    pub text: String,
}

/// Everything needed to launch one external tool.
#[derive(Debug, Clone)]
pub struct InvocationSpec {
    tool: String,
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl InvocationSpec {
    /// `tool` is the name used in messages; `program` is what gets executed.
    pub fn new(tool: &str, program: &str, args: Vec<String>, working_dir: &Path) -> Self {
        Self {
            tool: tool.to_string(),
            program: program.to_string(),
            args,
            working_dir: working_dir.to_path_buf(),
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Program and arguments as one display line.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit code and captured output of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl RunResult {
    pub fn push(&mut self, chunk: &OutputChunk) {
        match chunk.stream {
            OutputStream::Stdout => self.stdout.push(chunk.text.clone()),
            OutputStream::Stderr => self.stderr.push(chunk.text.clone()),
        }
    }

    pub fn stdout_text(&self) -> String {
        self.stdout.concat()
    }

    pub fn stderr_text(&self) -> String {
        self.stderr.concat()
    }
}

/// Log text for a chunk: stderr is prefixed with `ERROR: `.
pub fn tagged_text(chunk: &OutputChunk) -> Cow<'_, str> {
    match chunk.stream {
        OutputStream::Stdout => Cow::Borrowed(&chunk.text),
        OutputStream::Stderr => Cow::Owned(format!("ERROR: {}", chunk.text)),
    }
}

/// Runs one external process per call.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Run `spec` to completion, handing every output chunk to `on_chunk`
    /// in arrival order. Non-zero exit is an error.
    async fn run(
        &self,
        spec: &InvocationSpec,
        on_chunk: &mut (dyn for<'c> FnMut(&'c OutputChunk) + Send),
    ) -> Result<RunResult>;
}

/// [`Runner`] backed by real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl Runner for ProcessRunner {
    async fn run(
        &self,
        spec: &InvocationSpec,
        on_chunk: &mut (dyn for<'c> FnMut(&'c OutputChunk) + Send),
    ) -> Result<RunResult> {
        tracing::debug!(
            tool = spec.tool(),
            program = spec.program(),
            cwd = %spec.working_dir().display(),
            "spawning external tool"
        );

        let mut child = Command::new(launch_program(spec.program()))
            .args(spec.args())
            .current_dir(spec.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RepomixBridgeError::Launch {
                tool: spec.tool().to_string(),
                source,
            })?;

        let (tx, mut rx) = mpsc::unbounded_channel::<std::io::Result<OutputChunk>>();
        if let Some(stdout) = child.stdout.take() {
            spawn_pipe_reader(stdout, OutputStream::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_pipe_reader(stderr, OutputStream::Stderr, tx.clone());
        }
        drop(tx);

        let mut result = RunResult::default();
        let mut stream_error = None;
        while let Some(message) = rx.recv().await {
            match message {
                Ok(chunk) => {
                    on_chunk(&chunk);
                    result.push(&chunk);
                }
                Err(e) => {
                    tracing::warn!(tool = spec.tool(), "failed reading child output: {e}");
                    stream_error.get_or_insert(e);
                }
            }
        }

        let status = child.wait().await?;
        match status.code() {
            Some(0) => {
                if let Some(e) = stream_error {
                    return Err(RepomixBridgeError::Stream {
                        tool: spec.tool().to_string(),
                        reason: e.to_string(),
                    });
                }
                result.exit_code = 0;
                Ok(result)
            }
            Some(code) => Err(RepomixBridgeError::NonZeroExit {
                tool: spec.tool().to_string(),
                code,
            }),
            None => Err(RepomixBridgeError::Terminated {
                tool: spec.tool().to_string(),
            }),
        }
    }
}

/// What to hand to `Command::new` for `program`.
///
/// On Windows a bare name is looked up through `PATH` and `PATHEXT`, since
/// npm installs tools such as repomix as `.cmd` shims and a plain spawn only
/// finds `.exe` files.
fn launch_program(program: &str) -> PathBuf {
    #[cfg(windows)]
    {
        let pathext = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".into());
        if let Some(found) =
            search_path(program, std::env::var_os("PATH").as_deref(), &pathext)
        {
            return found;
        }
    }
    PathBuf::from(program)
}

/// Find `program` in the `PATH`-style `path_var`, trying each `;`-separated
/// extension of `pathext`. Names with a directory part or an extension are
/// left alone.
#[cfg_attr(not(windows), allow(dead_code))]
fn search_path(program: &str, path_var: Option<&OsStr>, pathext: &str) -> Option<PathBuf> {
    let name = Path::new(program);
    if name.components().count() != 1 || name.extension().is_some() {
        return None;
    }
    let extensions: Vec<&str> = pathext
        .split(';')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect();

    std::env::split_paths(path_var?).find_map(|dir| {
        extensions.iter().find_map(|ext| {
            [ext.to_string(), ext.to_ascii_lowercase()]
                .into_iter()
                .map(|ext| dir.join(format!("{program}{ext}")))
                .find(|candidate| candidate.is_file())
        })
    })
}

/// Forward a pipe to `tx` chunk by chunk until EOF.
fn spawn_pipe_reader<R>(
    mut pipe: R,
    stream: OutputStream,
    tx: mpsc::UnboundedSender<std::io::Result<OutputChunk>>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_BUF_SIZE];
        let mut pending = Vec::new();
        loop {
            match pipe.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    pending.extend_from_slice(&buf[..n]);
                    let text = drain_utf8(&mut pending);
                    if !text.is_empty() && tx.send(Ok(OutputChunk { stream, text })).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    return;
                }
            }
        }
        if !pending.is_empty() {
            let text = String::from_utf8_lossy(&pending).into_owned();
            let _ = tx.send(Ok(OutputChunk { stream, text }));
        }
    });
}

/// Decode as much of `pending` as possible, keeping an incomplete trailing
/// UTF-8 sequence for the next read. Invalid bytes become U+FFFD.
fn drain_utf8(pending: &mut Vec<u8>) -> String {
    let mut out = String::new();
    let mut start = 0;
    loop {
        match std::str::from_utf8(&pending[start..]) {
            Ok(valid) => {
                out.push_str(valid);
                pending.clear();
                return out;
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&pending[start..valid_end]));
                match e.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + len;
                    }
                    None => {
                        pending.drain(..valid_end);
                        return out;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_keeps_split_multibyte_sequence() {
        // "é" is 0xC3 0xA9
        let mut pending = vec![b'a', 0xC3];
        assert_eq!(drain_utf8(&mut pending), "a");
        assert_eq!(pending, vec![0xC3]);

        pending.push(0xA9);
        assert_eq!(drain_utf8(&mut pending), "é");
        assert!(pending.is_empty());
    }

    #[test]
    fn drain_replaces_invalid_bytes() {
        let mut pending = vec![b'a', 0xFF, b'b'];
        assert_eq!(drain_utf8(&mut pending), "a\u{FFFD}b");
        assert!(pending.is_empty());
    }

    #[test]
    fn command_line_joins_program_and_args() {
        let spec = InvocationSpec::new(
            "claudesync",
            "claudesync",
            vec!["push".into()],
            Path::new("/tmp"),
        );
        assert_eq!(spec.command_line(), "claudesync push");
    }

    #[test]
    fn stderr_chunks_are_tagged() {
        let out = OutputChunk {
            stream: OutputStream::Stdout,
            text: "packed\n".into(),
        };
        let err = OutputChunk {
            stream: OutputStream::Stderr,
            text: "warn: big file\n".into(),
        };
        assert_eq!(tagged_text(&out), "packed\n");
        assert_eq!(tagged_text(&err), "ERROR: warn: big file\n");
    }

    #[test]
    fn search_path_finds_cmd_shim() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("repomix.cmd"), "@echo off").unwrap();
        let path_var = std::env::join_paths([dir.path()]).unwrap();

        let found = search_path("repomix", Some(&path_var), ".com;.exe;.bat;.cmd");
        assert_eq!(found, Some(dir.path().join("repomix.cmd")));

        assert_eq!(search_path("claudesync", Some(&path_var), ".exe;.cmd"), None);
        assert_eq!(search_path("repomix.cmd", Some(&path_var), ".cmd"), None);
        assert_eq!(search_path("repomix", None, ".cmd"), None);
    }

    #[test]
    fn run_result_concatenates_in_order() {
        let mut result = RunResult::default();
        for (stream, text) in [
            (OutputStream::Stdout, "a"),
            (OutputStream::Stderr, "x"),
            (OutputStream::Stdout, "b"),
        ] {
            result.push(&OutputChunk {
                stream,
                text: text.into(),
            });
        }
        assert_eq!(result.stdout_text(), "ab");
        assert_eq!(result.stderr_text(), "x");
    }
}
