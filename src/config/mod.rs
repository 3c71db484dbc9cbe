pub mod executable;
pub mod repomix;
pub mod settings;

pub use executable::*;
pub use repomix::*;
pub use settings::*;

use std::path::PathBuf;

/// Settings key for the repomix override path.
pub const REPOMIX_PATH_KEY: &str = "repomix_path";

/// Settings key for the claudesync override path.
pub const CLAUDESYNC_PATH_KEY: &str = "claudesync_path";

/// Returns the global config directory path: `~/.config/repomix-bridge/`
pub fn dirs_global() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("repomix-bridge")
}

/// Returns the global settings file: `~/.config/repomix-bridge/config.yml`
pub fn global_settings_path() -> PathBuf {
    dirs_global().join("config.yml")
}
