//! Post-pack action menu.
//!
//! The menu is re-shown after every completed action until the user picks
//! "Done" or dismisses it. Actions never overlap.

use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::host::NoticeLevel;
use crate::sync::{run_sync_flow, SyncOutcome};

pub const PACKED_MESSAGE: &str = "Files successfully packed with Repomix!";
pub const PACKED_DETAIL: &str = "Select any actions below or click Done when finished.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowUpAction {
    OpenArtifact,
    ViewLog,
    Sync,
    Done,
}

impl FollowUpAction {
    pub fn label(&self) -> &'static str {
        match self {
            FollowUpAction::OpenArtifact => "Open File",
            FollowUpAction::ViewLog => "View Output",
            FollowUpAction::Sync => "Sync to Claude",
            FollowUpAction::Done => "Done",
        }
    }
}

/// Actions valid right now. Recomputed each time it is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpMenu {
    actions: Vec<FollowUpAction>,
}

impl FollowUpMenu {
    pub fn for_pack(offer_sync: bool) -> Self {
        let mut actions = vec![FollowUpAction::OpenArtifact, FollowUpAction::ViewLog];
        if offer_sync {
            actions.push(FollowUpAction::Sync);
        }
        actions.push(FollowUpAction::Done);
        Self { actions }
    }

    pub fn actions(&self) -> &[FollowUpAction] {
        &self.actions
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.actions.iter().map(FollowUpAction::label).collect()
    }

    /// Map a picked label back to its action. Labels not on this menu are `None`.
    pub fn resolve(&self, label: &str) -> Option<FollowUpAction> {
        self.actions.iter().copied().find(|a| a.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpState {
    Idle,
    Prompting,
    Dispatching(FollowUpAction),
}

/// Counts of what the user did while the menu was up.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FollowUpSummary {
    pub artifact_opened: usize,
    pub artifact_open_failed: usize,
    pub log_shown: usize,
    pub sync_runs: Vec<SyncOutcome>,
}

pub struct FollowUpController<'a> {
    ctx: &'a Context,
    artifact: PathBuf,
}

impl<'a> FollowUpController<'a> {
    pub fn new(ctx: &'a Context, artifact: &Path) -> Self {
        Self {
            ctx,
            artifact: artifact.to_path_buf(),
        }
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Drive the menu until "Done" or dismissal.
    pub async fn run(&self) -> FollowUpSummary {
        let mut summary = FollowUpSummary::default();
        let mut state = FollowUpState::Prompting;

        loop {
            state = match state {
                FollowUpState::Idle => break,
                FollowUpState::Prompting => self.prompt().await,
                FollowUpState::Dispatching(action) => {
                    self.dispatch(action, &mut summary).await;
                    FollowUpState::Prompting
                }
            };
        }

        summary
    }

    async fn prompt(&self) -> FollowUpState {
        let menu = FollowUpMenu::for_pack(self.ctx.settings.offer_sync);
        let choice = self
            .ctx
            .host
            .prompt(
                NoticeLevel::Info,
                PACKED_MESSAGE,
                Some(PACKED_DETAIL),
                &menu.labels(),
            )
            .await;

        match choice.as_deref().and_then(|label| menu.resolve(label)) {
            None | Some(FollowUpAction::Done) => FollowUpState::Idle,
            Some(action) => FollowUpState::Dispatching(action),
        }
    }

    async fn dispatch(&self, action: FollowUpAction, summary: &mut FollowUpSummary) {
        tracing::debug!(action = action.label(), "follow-up action");
        match action {
            FollowUpAction::OpenArtifact => {
                match self.ctx.host.open_document(&self.artifact).await {
                    Ok(()) => summary.artifact_opened += 1,
                    Err(e) => {
                        summary.artifact_open_failed += 1;
                        self.ctx.log.append_line(&format!("Error: {e}"));
                        self.ctx.host.notify(NoticeLevel::Error, &e.to_string());
                    }
                }
            }
            FollowUpAction::ViewLog => {
                self.ctx.host.show_log();
                summary.log_shown += 1;
            }
            FollowUpAction::Sync => {
                let outcome = run_sync_flow(self.ctx).await;
                summary.sync_runs.push(outcome);
            }
            FollowUpAction::Done => {}
        }
    }
}
