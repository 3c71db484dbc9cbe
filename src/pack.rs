//! The "pack files" command: selection in, repomix artifact out.

use crate::bootstrap::ensure_config_files;
use crate::config::{artifact_path, resolve_executable, REPOMIX_PATH_KEY};
use crate::context::Context;
use crate::error::{RepomixBridgeError, Result};
use crate::followup::{FollowUpController, FollowUpSummary};
use crate::host::NoticeLevel;
use crate::include::{build_include_pattern, pack_arguments};
use crate::process::{tagged_text, InvocationSpec, OutputChunk};

/// Default command name of the packaging tool.
pub const PACK_TOOL: &str = "repomix";

/// Where a selection came from; only changes how an empty one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Files open in the editor.
    OpenEditors,
    /// Files picked explicitly, e.g. in a file explorer.
    Explicit,
}

impl SelectionSource {
    fn empty_warning(&self) -> &'static str {
        match self {
            SelectionSource::OpenEditors => "No open files to pack!",
            SelectionSource::Explicit => "No files selected to pack!",
        }
    }
}

/// A non-empty, ordered list of absolute file paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(Vec<String>);

impl Selection {
    pub fn new(paths: Vec<String>) -> Result<Self> {
        if paths.is_empty() {
            return Err(RepomixBridgeError::EmptySelection);
        }
        Ok(Self(paths))
    }

    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build the repomix invocation for a selection.
pub fn pack_invocation(
    ctx: &Context,
    program: &str,
    selection: &Selection,
) -> Result<InvocationSpec> {
    let pattern = build_include_pattern(selection.paths(), ctx.workspace_str()?);
    Ok(InvocationSpec::new(
        PACK_TOOL,
        program,
        pack_arguments(&pattern, ctx.settings.copy_to_clipboard),
        &ctx.workspace,
    ))
}

/// Pack `selection` with repomix, then run the follow-up menu.
pub async fn pack_files(ctx: &Context, selection: &Selection) -> Result<FollowUpSummary> {
    if !ctx.workspace.is_dir() {
        return Err(RepomixBridgeError::NoWorkspace {
            path: ctx.workspace.clone(),
        });
    }

    let report = ensure_config_files(&ctx.workspace, ctx.log.as_ref()).await;
    if report.created_any() {
        ctx.host.notify(
            NoticeLevel::Info,
            "Repomix configuration files created successfully!",
        );
    }

    let program = resolve_executable(
        ctx.host.as_ref(),
        REPOMIX_PATH_KEY,
        PACK_TOOL,
        ctx.settings.repomix_path.as_deref(),
    )
    .await;
    let spec = pack_invocation(ctx, &program, selection)?;
    tracing::info!(
        files = selection.len(),
        command = %spec.command_line(),
        "packing selection"
    );

    ctx.host.show_log();
    ctx.host.set_progress(Some("Packing files with Repomix"));
    let log = ctx.log.clone();
    let mut forward = |chunk: &OutputChunk| log.append(&tagged_text(chunk));
    let run = ctx.runner.run(&spec, &mut forward).await;
    ctx.host.set_progress(None);
    run?;

    ctx.sync_status
        .show_for(ctx.settings.sync_affordance_ttl());
    ctx.host.show_status(&ctx.sync_status);

    let artifact = artifact_path(&ctx.workspace).await;
    Ok(FollowUpController::new(ctx, &artifact).run().await)
}

/// Command boundary for packing: every failure becomes a user-visible notice
/// and a log line. The error is still returned so callers can set an exit code.
pub async fn handle_pack(
    ctx: &Context,
    paths: Vec<String>,
    source: SelectionSource,
) -> Result<FollowUpSummary> {
    let selection = match Selection::new(paths) {
        Ok(s) => s,
        Err(e) => {
            ctx.host.notify(NoticeLevel::Warning, source.empty_warning());
            return Err(e);
        }
    };

    ctx.log.clear();
    if source == SelectionSource::OpenEditors {
        ctx.log
            .append_line(&format!("Packing {} open files:", selection.len()));
    } else {
        ctx.log
            .append_line(&format!("Packing {} selected files:", selection.len()));
    }
    for path in selection.paths() {
        ctx.log.append_line(path);
    }

    match pack_files(ctx, &selection).await {
        Ok(summary) => Ok(summary),
        Err(e) => {
            tracing::warn!("pack failed: {e}");
            ctx.host
                .notify(NoticeLevel::Error, &format!("Error packing files: {e}"));
            ctx.log.append_line(&format!("Error: {e}"));
            Err(e)
        }
    }
}
