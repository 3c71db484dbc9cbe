use std::path::{Path, PathBuf};

use crate::error::{utf8_path, Result};
use crate::pack::{handle_pack, SelectionSource};

/// Pack files given on the command line.
pub async fn run_pack(
    workspace: &Path,
    paths: &[PathBuf],
    copy: bool,
    interactive: bool,
) -> Result<()> {
    let mut ctx = super::terminal_context(workspace, interactive)?;
    ctx.settings.copy_to_clipboard |= copy;

    let cwd = std::env::current_dir()?;
    let files = paths
        .iter()
        .map(|p| absolute_path_string(&cwd, p))
        .collect::<Result<Vec<_>>>()?;

    if handle_pack(&ctx, files, SelectionSource::Explicit)
        .await
        .is_err()
    {
        std::process::exit(1);
    }
    Ok(())
}

/// Pack the editor's open files, listed one per line in `files_from`
/// (`-` reads stdin, which also leaves every prompt dismissed).
pub async fn run_pack_open(
    workspace: &Path,
    files_from: &Path,
    copy: bool,
    interactive: bool,
) -> Result<()> {
    let from_stdin = files_from == Path::new("-");
    let listing = if from_stdin {
        let mut buf = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(files_from).await?
    };

    let mut ctx = super::terminal_context(workspace, interactive && !from_stdin)?;
    ctx.settings.copy_to_clipboard |= copy;

    let files = parse_open_files(&listing, workspace);
    tracing::debug!(count = files.len(), "open files read");

    if handle_pack(&ctx, files, SelectionSource::OpenEditors)
        .await
        .is_err()
    {
        std::process::exit(1);
    }
    Ok(())
}

/// Parse an open-editors listing: one path or `file://` URI per line.
/// Blank lines and non-file URIs (untitled buffers, remote documents) are
/// skipped; relative paths are taken relative to the workspace.
pub fn parse_open_files(listing: &str, workspace: &Path) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            if line.starts_with("file:") {
                return file_uri_path(line);
            }
            if has_uri_scheme(line) {
                return None;
            }
            let path = Path::new(line);
            if path.is_absolute() {
                Some(line.to_string())
            } else {
                workspace.join(path).to_str().map(String::from)
            }
        })
        .collect()
}

/// Decode a `file://` URI into a local path, as the editor would.
fn file_uri_path(uri: &str) -> Option<String> {
    let path = match url::Url::parse(uri).map(|u| u.to_file_path()) {
        Ok(Ok(path)) => path,
        _ => {
            tracing::warn!(uri, "skipping file URI that is not a local path");
            return None;
        }
    };
    match utf8_path(&path) {
        Ok(p) => Some(p.to_string()),
        Err(e) => {
            tracing::warn!("skipping open file: {e}");
            None
        }
    }
}

/// `scheme:` prefixes such as `untitled:` or `vscode-remote://`. Single
/// letters are Windows drive prefixes, not schemes.
fn has_uri_scheme(line: &str) -> bool {
    match line.split_once(':') {
        Some((scheme, _)) => {
            scheme.len() > 1
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn absolute_path_string(cwd: &Path, path: &Path) -> Result<String> {
    let abs = std::path::absolute(cwd.join(path))?;
    Ok(utf8_path(&abs)?.to_string())
}
