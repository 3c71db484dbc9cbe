use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RepomixBridgeError, Result};

/// Project-level settings file, relative to the workspace root.
pub const PROJECT_SETTINGS_FILE: &str = ".repomix-bridge.yml";

/// Effective bridge settings after layering global and project files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Override for the repomix executable. Used only if it exists.
    pub repomix_path: Option<PathBuf>,

    /// Override for the claudesync executable. Used only if it exists.
    pub claudesync_path: Option<PathBuf>,

    /// Pass `--copy` so repomix copies its output to the clipboard.
    pub copy_to_clipboard: bool,

    /// Offer "Sync to Claude" in the post-pack menu. Default: true.
    pub offer_sync: bool,

    /// How long the sync affordance stays visible after a pack. Default: 300.
    pub sync_affordance_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repomix_path: None,
            claudesync_path: None,
            copy_to_clipboard: false,
            offer_sync: true,
            sync_affordance_secs: 300,
        }
    }
}

/// One settings file. Absent keys leave lower layers untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    #[serde(default)]
    pub repomix_path: Option<PathBuf>,
    #[serde(default)]
    pub claudesync_path: Option<PathBuf>,
    #[serde(default)]
    pub copy_to_clipboard: Option<bool>,
    #[serde(default)]
    pub offer_sync: Option<bool>,
    #[serde(default)]
    pub sync_affordance_secs: Option<u64>,
}

impl SettingsLayer {
    /// Load a layer from a YAML file. Returns an empty layer if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|e| RepomixBridgeError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl Settings {
    /// Apply a layer on top of the current values.
    pub fn apply(&mut self, layer: SettingsLayer) {
        if let Some(p) = layer.repomix_path {
            self.repomix_path = Some(p);
        }
        if let Some(p) = layer.claudesync_path {
            self.claudesync_path = Some(p);
        }
        if let Some(v) = layer.copy_to_clipboard {
            self.copy_to_clipboard = v;
        }
        if let Some(v) = layer.offer_sync {
            self.offer_sync = v;
        }
        if let Some(v) = layer.sync_affordance_secs {
            self.sync_affordance_secs = v;
        }
    }

    /// Load global settings from `global_path`, then the project file under
    /// `workspace`, later layers winning.
    pub fn load_layered(global_path: &Path, workspace: &Path) -> Result<Self> {
        let mut settings = Self::default();
        settings.apply(SettingsLayer::load_from(global_path)?);
        settings.apply(SettingsLayer::load_from(
            &workspace.join(PROJECT_SETTINGS_FILE),
        )?);
        Ok(settings)
    }

    /// Load from `~/.config/repomix-bridge/config.yml` and the workspace.
    pub fn load(workspace: &Path) -> Result<Self> {
        Self::load_layered(&super::global_settings_path(), workspace)
    }

    pub fn sync_affordance_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sync_affordance_secs)
    }
}
