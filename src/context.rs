use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::error::{utf8_path, Result};
use crate::host::{Host, LogSink, StatusItem};
use crate::process::Runner;

/// Everything a command needs, passed explicitly instead of held in globals.
pub struct Context {
    pub workspace: PathBuf,
    pub settings: Settings,
    pub log: Arc<dyn LogSink>,
    pub host: Arc<dyn Host>,
    pub runner: Arc<dyn Runner>,
    /// Time-limited "Sync to Claude" affordance shown after a pack.
    pub sync_status: StatusItem,
}

impl Context {
    pub fn new(
        workspace: &Path,
        settings: Settings,
        log: Arc<dyn LogSink>,
        host: Arc<dyn Host>,
        runner: Arc<dyn Runner>,
    ) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
            settings,
            log,
            host,
            runner,
            sync_status: StatusItem::new(
                "$(sync) Sync to Claude",
                "Sync packed files to Claude",
                "sync",
            ),
        }
    }

    /// Workspace root as a string, for path relativization.
    pub fn workspace_str(&self) -> Result<&str> {
        utf8_path(&self.workspace)
    }
}
