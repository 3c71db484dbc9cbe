use std::path::Path;

use crate::error::Result;
use crate::sync::{run_sync_flow, SyncOutcome};

/// Push the workspace with claudesync after confirmation.
pub async fn run_sync(workspace: &Path, interactive: bool) -> Result<()> {
    let ctx = super::terminal_context(workspace, interactive)?;

    match run_sync_flow(&ctx).await {
        SyncOutcome::Failed => std::process::exit(1),
        SyncOutcome::NotConfigured => {
            eprintln!(
                "repomix-bridge: no claudesync config in {}, nothing to sync.",
                workspace.display()
            );
        }
        SyncOutcome::Declined | SyncOutcome::Pushed => {}
    }
    Ok(())
}
