use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum RepomixBridgeError {
    #[error("could not execute {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed with exit code {code}")]
    NonZeroExit { tool: String, code: i32 },

    #[error("{tool} was terminated before reporting an exit code")]
    Terminated { tool: String },

    #[error("output stream error from {tool}: {reason}")]
    Stream { tool: String, reason: String },

    #[error("no files selected to pack")]
    EmptySelection,

    #[error("workspace folder not found: {path}")]
    NoWorkspace { path: PathBuf },

    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("{reason}")]
    SyncConfig { path: PathBuf, reason: String },

    #[error("could not open {path}: {reason}")]
    OpenDocument { path: PathBuf, reason: String },

    #[error("prompt error: {reason}")]
    Prompt { reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RepomixBridgeError {
    /// True when the external tool ran but reported failure, as opposed to
    /// never having started.
    pub fn is_exit_failure(&self) -> bool {
        matches!(self, Self::NonZeroExit { .. } | Self::Terminated { .. })
    }

    /// True when the external tool could not be started at all.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::Launch { .. })
    }
}

pub type Result<T> = std::result::Result<T, RepomixBridgeError>;

/// Borrow `path` as UTF-8, rejecting names that would otherwise be mangled.
pub fn utf8_path(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| RepomixBridgeError::NonUtf8Path {
        path: path.to_path_buf(),
    })
}
