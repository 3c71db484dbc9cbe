pub mod init;
pub mod pack;
pub mod sync;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{global_settings_path, Settings};
use crate::context::Context;
use crate::error::{utf8_path, RepomixBridgeError, Result};
use crate::process::ProcessRunner;
use crate::terminal::{TerminalHost, TerminalLog};

/// Resolve the workspace root: `--workspace` if given, else the current directory.
pub fn resolve_workspace(workspace: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let root = match workspace {
        Some(p) => std::path::absolute(cwd.join(p))?,
        None => cwd,
    };
    utf8_path(&root)?;
    if !root.is_dir() {
        return Err(RepomixBridgeError::NoWorkspace { path: root });
    }
    Ok(root)
}

/// Build a terminal-backed context for `workspace`.
pub fn terminal_context(workspace: &Path, interactive: bool) -> Result<Context> {
    let settings = Settings::load(workspace)?;
    let log = Arc::new(TerminalLog::new());
    let host = Arc::new(TerminalHost::new(
        log.clone(),
        interactive,
        &global_settings_path(),
    ));
    Ok(Context::new(
        workspace,
        settings,
        log,
        host,
        Arc::new(ProcessRunner),
    ))
}
