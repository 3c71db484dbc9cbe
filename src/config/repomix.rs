use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// repomix's own config file, relative to the workspace root.
pub const REPOMIX_CONFIG_FILE: &str = "repomix.config.json";

/// Instructions document referenced by the default config.
pub const INSTRUCTIONS_FILE: &str = "repomix-instructions.md";

/// Ignore rules consumed by claudesync.
pub const CLAUDE_IGNORE_FILE: &str = ".claudeignore";

/// Output path repomix writes to when the config doesn't say otherwise.
pub const DEFAULT_OUTPUT_FILE: &str = "repomix-selection.xml";

pub const DEFAULT_INSTRUCTIONS: &str = "# Coding Guidelines
- When given a prompt think through the problem, then give an outline of your proposed solution
- Ask the user if they would like to proceed with this approach before generating any code
- If you need more context from files which have been omitted ask to see them or for more details
- Suggest splitting files into smaller, focused units when appropriate
- Add comments for non-obvious logic. Keep all text in English
- Use best coding practices, suggest refactoring existing code to follow best practices when appropriate

# Generate Comprehensive Output
- Include all content without abbreviation, unless specified otherwise
- Optimize for handling large codebases while maintaining output quality";

pub const DEFAULT_CLAUDE_IGNORE: &str = "# First ignore everything
*

# Then unignore repomix-output files
!repomix-output*";

/// Subset of `repomix.config.json` the bridge writes and reads.
///
/// Unknown keys in user files are ignored; missing keys take the defaults
/// written by `init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepomixConfig {
    pub output: OutputConfig,
    pub include: Vec<String>,
    pub ignore: IgnoreConfig,
    pub security: SecurityConfig,
    pub token_count: TokenCountConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    pub file_path: String,
    pub style: String,
    pub instruction_file_path: String,
    pub file_summary: bool,
    pub directory_structure: bool,
    pub remove_comments: bool,
    pub remove_empty_lines: bool,
    pub top_files_length: u32,
    pub show_line_numbers: bool,
    pub copy_to_clipboard: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IgnoreConfig {
    pub use_gitignore: bool,
    pub use_default_patterns: bool,
    pub custom_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityConfig {
    pub enable_security_check: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenCountConfig {
    pub encoding: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_path: DEFAULT_OUTPUT_FILE.into(),
            style: "xml".into(),
            instruction_file_path: INSTRUCTIONS_FILE.into(),
            file_summary: true,
            directory_structure: true,
            remove_comments: false,
            remove_empty_lines: false,
            top_files_length: 5,
            show_line_numbers: false,
            copy_to_clipboard: false,
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            use_gitignore: true,
            use_default_patterns: true,
            custom_patterns: Vec::new(),
        }
    }
}

impl Default for TokenCountConfig {
    fn default() -> Self {
        Self {
            encoding: "o200k_base".into(),
        }
    }
}

impl RepomixConfig {
    /// The default config as written by `init`: pretty JSON, two-space indent.
    pub fn default_json() -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::default())
    }
}

/// Where repomix will write its output for this workspace.
///
/// Reads `output.filePath` from the workspace's repomix config; falls back to
/// [`DEFAULT_OUTPUT_FILE`] when the file is missing or unreadable.
pub async fn artifact_path(workspace: &Path) -> PathBuf {
    let config_path = workspace.join(REPOMIX_CONFIG_FILE);
    let declared = match tokio::fs::read_to_string(&config_path).await {
        Ok(contents) => match serde_json::from_str::<RepomixConfig>(&contents) {
            Ok(config) => Some(config.output.file_path),
            Err(e) => {
                tracing::warn!(
                    "ignoring unparsable {}: {}",
                    config_path.display(),
                    e
                );
                None
            }
        },
        Err(_) => None,
    };

    let file = declared
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string());
    workspace.join(file)
}
