use std::path::Path;

use crate::host::{Host, NoticeLevel};

/// Pick the program to run for `default_program`.
///
/// A configured override is used only if it exists on disk. An override that
/// doesn't exist prompts the user once, offering to open the `key` setting,
/// and then falls back to the default command name.
pub async fn resolve_executable(
    host: &dyn Host,
    key: &str,
    default_program: &str,
    configured: Option<&Path>,
) -> String {
    let Some(custom) = configured.filter(|p| !p.as_os_str().is_empty()) else {
        return default_program.to_string();
    };

    if custom.exists() {
        return custom.to_string_lossy().into_owned();
    }

    tracing::warn!(
        key,
        path = %custom.display(),
        "configured executable does not exist, using default"
    );
    let message = format!(
        "Custom path for {} is invalid: {}. Would you like to configure it?",
        default_program,
        custom.display()
    );
    let choice = host
        .prompt(
            NoticeLevel::Warning,
            &message,
            None,
            &["Configure", "Use Default"],
        )
        .await;
    if choice.as_deref() == Some("Configure") {
        host.open_settings(key).await;
    }

    default_program.to_string()
}
