//! Creates the default repomix/claudesync files a workspace needs.
//!
//! Only missing files are written, and creation uses create-new semantics so
//! existing user content is never overwritten.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::config::{
    RepomixConfig, CLAUDE_IGNORE_FILE, DEFAULT_CLAUDE_IGNORE, DEFAULT_INSTRUCTIONS,
    INSTRUCTIONS_FILE, REPOMIX_CONFIG_FILE,
};
use crate::error::Result;
use crate::host::LogSink;

/// A file with fixed default content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlob {
    pub relative_path: &'static str,
    pub contents: String,
}

/// The three files created on first use.
pub fn default_blobs() -> Result<Vec<ConfigBlob>> {
    Ok(vec![
        ConfigBlob {
            relative_path: REPOMIX_CONFIG_FILE,
            contents: RepomixConfig::default_json()?,
        },
        ConfigBlob {
            relative_path: INSTRUCTIONS_FILE,
            contents: DEFAULT_INSTRUCTIONS.to_string(),
        },
        ConfigBlob {
            relative_path: CLAUDE_IGNORE_FILE,
            contents: DEFAULT_CLAUDE_IGNORE.to_string(),
        },
    ])
}

/// What happened to each blob.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub created: Vec<PathBuf>,
    pub existing: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BootstrapReport {
    pub fn created_any(&self) -> bool {
        !self.created.is_empty()
    }
}

#[derive(Debug)]
enum BlobOutcome {
    Created,
    Existing,
}

/// Write `contents` to `path` unless something already exists there.
async fn write_if_absent(path: &Path, contents: &str) -> std::io::Result<BlobOutcome> {
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Ok(BlobOutcome::Existing)
        }
        Err(e) => return Err(e),
    };
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;
    Ok(BlobOutcome::Created)
}

/// Ensure every blob exists under `workspace`, writing missing ones concurrently.
///
/// Best effort: failures are logged and reported, never returned as errors.
pub async fn ensure_blobs(
    workspace: &Path,
    blobs: Vec<ConfigBlob>,
    log: &dyn LogSink,
) -> BootstrapReport {
    let handles: Vec<_> = blobs
        .into_iter()
        .map(|blob| {
            let path = workspace.join(blob.relative_path);
            let handle = tokio::spawn({
                let path = path.clone();
                async move { write_if_absent(&path, &blob.contents).await }
            });
            (blob.relative_path, path, handle)
        })
        .collect();

    let mut report = BootstrapReport::default();
    for (name, path, handle) in handles {
        let outcome = match handle.await {
            Ok(res) => res.map_err(|e| e.to_string()),
            Err(e) => Err(format!("write task failed: {e}")),
        };
        match outcome {
            Ok(BlobOutcome::Created) => {
                log.append_line(&format!("Created {name}"));
                report.created.push(path);
            }
            Ok(BlobOutcome::Existing) => {
                tracing::debug!(file = name, "already exists, leaving untouched");
                report.existing.push(path);
            }
            Err(reason) => {
                tracing::warn!(file = name, "failed to create: {reason}");
                log.append_line(&format!("Warning: Failed to create {name}: {reason}"));
                report.failed.push((path, reason));
            }
        }
    }
    report
}

/// Ensure the default repomix config, instructions and `.claudeignore` exist.
pub async fn ensure_config_files(workspace: &Path, log: &dyn LogSink) -> BootstrapReport {
    match default_blobs() {
        Ok(blobs) => ensure_blobs(workspace, blobs, log).await,
        Err(e) => {
            log.append_line(&format!(
                "Warning: Failed to create configuration files: {e}"
            ));
            BootstrapReport {
                failed: vec![(workspace.join(REPOMIX_CONFIG_FILE), e.to_string())],
                ..Default::default()
            }
        }
    }
}
