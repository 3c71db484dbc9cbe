//! Builds the `--include` argument handed to repomix.
//!
//! repomix parses `--include` as a comma separated list, so every item is
//! made relative to the workspace root and has its list delimiters
//! (comma and whitespace) backslash-escaped before joining.

use std::sync::LazyLock;

use regex::Regex;

static LIST_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([,\s])").expect("delimiter pattern is valid"));

/// Strip a leading `workspace/` or `workspace\` from `path`.
///
/// Paths outside the workspace are returned unchanged.
pub fn relative_to_workspace(path: &str, workspace: &str) -> String {
    let root = workspace.trim_end_matches(['/', '\\']);
    if root.is_empty() {
        return path.to_string();
    }
    for sep in ['/', '\\'] {
        if let Some(rest) = path
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix(sep))
        {
            return rest.to_string();
        }
    }
    path.to_string()
}

/// Backslash-escape every comma and whitespace character in a list item.
pub fn escape_list_item(item: &str) -> String {
    LIST_DELIMITER.replace_all(item, r"\${1}").into_owned()
}

/// Relativize, escape and comma-join the selected paths.
pub fn build_include_pattern<S: AsRef<str>>(paths: &[S], workspace: &str) -> String {
    paths
        .iter()
        .map(|p| escape_list_item(&relative_to_workspace(p.as_ref(), workspace)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split an include pattern back into its items, dropping escape markers.
///
/// A backslash only escapes a following delimiter; any other backslash is
/// kept as a literal path character. The escaping leaves existing backslashes
/// alone, so an item ending in `\` reads back as an escaped comma and merges
/// with the next item. File paths never end in a separator, so selections
/// round-trip.
pub fn split_include_pattern(pattern: &str) -> Vec<String> {
    if pattern.is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next) if next == ',' || next.is_whitespace() => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push('\\'),
            },
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}

/// Arguments for a repomix packing run.
pub fn pack_arguments(include_pattern: &str, copy_to_clipboard: bool) -> Vec<String> {
    let mut args = vec!["--include".to_string(), include_pattern.to_string()];
    if copy_to_clipboard {
        args.push("--copy".to_string());
    }
    args
}
