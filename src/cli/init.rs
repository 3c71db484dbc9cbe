use std::path::Path;

use crate::bootstrap::ensure_config_files;
use crate::error::Result;
use crate::terminal::TerminalLog;

/// Create the default repomix config, instructions and `.claudeignore`.
pub async fn run_init(workspace: &Path) -> Result<()> {
    let log = TerminalLog::new();
    log.reveal();

    let report = ensure_config_files(workspace, &log).await;
    for path in &report.existing {
        eprintln!("repomix-bridge: {} already exists", path.display());
    }

    if !report.failed.is_empty() {
        std::process::exit(1);
    }
    if report.created_any() {
        eprintln!("repomix-bridge: configuration files created in {}", workspace.display());
    }
    Ok(())
}
