//! Optional push of the workspace to a claudesync project.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{resolve_executable, CLAUDESYNC_PATH_KEY};
use crate::context::Context;
use crate::error::{RepomixBridgeError, Result};
use crate::host::NoticeLevel;
use crate::process::{tagged_text, InvocationSpec, OutputChunk};

/// Default command name of the sync tool.
pub const SYNC_TOOL: &str = "claudesync";

/// The single argument passed to the sync tool.
pub const SYNC_SUBCOMMAND: &str = "push";

/// claudesync's per-workspace config, relative to the workspace root.
pub const SYNC_CONFIG_FILE: &str = ".claudesync/config.local.json";

/// The fields of claudesync's local config the bridge reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaudeSyncConfig {
    pub active_project_id: String,
    pub active_project_name: String,
    #[serde(default)]
    pub active_provider: Option<String>,
    #[serde(default)]
    pub local_path: Option<String>,
    #[serde(default)]
    pub active_organization_id: Option<String>,
}

/// How a sync attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No claudesync config in the workspace.
    NotConfigured,
    /// The user answered anything but "Yes".
    Declined,
    Pushed,
    /// An error was reported to the user.
    Failed,
}

pub fn sync_config_path(workspace: &Path) -> PathBuf {
    workspace.join(SYNC_CONFIG_FILE)
}

/// Read claudesync's config. A missing file is `Ok(None)`; any other read or
/// parse failure is an error.
pub async fn read_sync_config(workspace: &Path) -> Result<Option<ClaudeSyncConfig>> {
    let path = sync_config_path(workspace);
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(RepomixBridgeError::SyncConfig {
                reason: format!("failed to read {}: {}", path.display(), e),
                path,
            })
        }
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| RepomixBridgeError::SyncConfig {
            reason: format!("invalid config in {}: {}", path.display(), e),
            path,
        })
}

/// Look for a sync target, confirm with the user and push.
///
/// Errors are returned to the caller unreported; see [`run_sync_flow`].
pub async fn check_and_push(ctx: &Context) -> Result<SyncOutcome> {
    let path = sync_config_path(&ctx.workspace);
    ctx.log.append_line(&format!(
        "\nChecking for Claude Sync config at: {}",
        path.display()
    ));

    let Some(config) = read_sync_config(&ctx.workspace).await? else {
        ctx.log
            .append_line("No Claude Sync configuration found - skipping sync prompt");
        return Ok(SyncOutcome::NotConfigured);
    };
    ctx.log.append_line(&format!(
        "Found Claude Sync config for project: {}",
        config.active_project_name
    ));

    let question = format!(
        "Sync changes to Claude Sync project \"{}\"?",
        config.active_project_name
    );
    let answer = ctx
        .host
        .prompt(NoticeLevel::Info, &question, None, &["Yes", "No"])
        .await;
    if answer.as_deref() != Some("Yes") {
        ctx.log.append_line("User declined Claude Sync operation");
        return Ok(SyncOutcome::Declined);
    }

    ctx.host.set_progress(Some("Syncing to Claude..."));
    let pushed = push(ctx).await;
    ctx.host.set_progress(None);
    pushed?;

    let view = ctx
        .host
        .prompt(
            NoticeLevel::Info,
            "Claude Sync completed successfully!",
            None,
            &["View Output"],
        )
        .await;
    if view.as_deref() == Some("View Output") {
        ctx.host.show_log();
    }

    Ok(SyncOutcome::Pushed)
}

async fn push(ctx: &Context) -> Result<()> {
    ctx.log.append_line("\nExecuting Claude Sync...");
    ctx.log
        .append_line(&format!("Command: {SYNC_TOOL} {SYNC_SUBCOMMAND}"));
    ctx.log.append_line(&format!(
        "Working directory: {}",
        ctx.workspace.display()
    ));

    let program = resolve_executable(
        ctx.host.as_ref(),
        CLAUDESYNC_PATH_KEY,
        SYNC_TOOL,
        ctx.settings.claudesync_path.as_deref(),
    )
    .await;
    let spec = InvocationSpec::new(
        SYNC_TOOL,
        &program,
        vec![SYNC_SUBCOMMAND.to_string()],
        &ctx.workspace,
    );

    let log = ctx.log.clone();
    let mut forward = |chunk: &OutputChunk| log.append(&tagged_text(chunk));

    match ctx.runner.run(&spec, &mut forward).await {
        Ok(_) => {
            ctx.log.append_line("Claude Sync completed successfully");
            tracing::info!(workspace = %ctx.workspace.display(), "claudesync push finished");
            Ok(())
        }
        Err(e) => {
            ctx.log.append_line(&e.to_string());
            Err(e)
        }
    }
}

/// Run the sync sub-flow, reporting any failure to the user.
pub async fn run_sync_flow(ctx: &Context) -> SyncOutcome {
    match check_and_push(ctx).await {
        Ok(outcome) => outcome,
        Err(e) => {
            report_sync_failure(ctx, &e).await;
            SyncOutcome::Failed
        }
    }
}

async fn report_sync_failure(ctx: &Context, error: &RepomixBridgeError) {
    tracing::warn!("claude sync failed: {error}");
    ctx.log
        .append_line(&format!("Claude Sync check failed: {error}"));
    let choice = ctx
        .host
        .prompt(
            NoticeLevel::Error,
            &format!("Claude Sync failed: {error}"),
            None,
            &["View Details"],
        )
        .await;
    if choice.as_deref() == Some("View Details") {
        ctx.host.show_log();
    }
}
