//! Workspace Path Validation
//!
//! Every storage operation funnels through `normalize_path` before any I/O.
//! Paths are slash-separated and relative to the workspace root; absolute
//! paths, drive letters, backslashes, and `..` segments are rejected with
//! `InvalidPath`. Validation is cheap and repeated in both backends rather
//! than trusted across the process boundary.

use draftbench_core::{CoreError, CoreResult};

/// Normalize and validate a file path.
///
/// Returns the canonical slash-separated relative path with `.` and empty
/// segments removed. An empty result (e.g. `""` or `"./"`) is invalid for
/// file operations; use [`normalize_dir_path`] where root is acceptable.
pub fn normalize_path(raw: &str) -> CoreResult<String> {
    let segments = validate_segments(raw)?;
    if segments.is_empty() {
        return Err(CoreError::invalid_path(format!(
            "'{}' does not name a workspace entry",
            raw
        )));
    }
    Ok(segments.join("/"))
}

/// Normalize a directory path where the workspace root (empty path) is a
/// valid target, as it is for `list`.
pub fn normalize_dir_path(raw: Option<&str>) -> CoreResult<String> {
    match raw {
        None => Ok(String::new()),
        Some(raw) => {
            let segments = validate_segments(raw)?;
            Ok(segments.join("/"))
        }
    }
}

fn validate_segments(raw: &str) -> CoreResult<Vec<&str>> {
    if raw.contains('\\') {
        return Err(CoreError::invalid_path(format!(
            "'{}' contains backslashes; paths are slash-separated",
            raw
        )));
    }
    if raw.starts_with('/') {
        return Err(CoreError::invalid_path(format!(
            "'{}' is absolute; paths are relative to the workspace root",
            raw
        )));
    }
    // Windows drive letters ("C:...") and URL schemes both smuggle a colon.
    if raw.contains(':') {
        return Err(CoreError::invalid_path(format!(
            "'{}' contains a ':' segment",
            raw
        )));
    }

    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(CoreError::invalid_path(format!(
                    "'{}' escapes the workspace root",
                    raw
                )));
            }
            s => segments.push(s),
        }
    }
    Ok(segments)
}

/// The parent directory of a normalized path, if it has one.
pub fn parent_of(path: &str) -> Option<&str> {
    path.rfind('/').map(|idx| &path[..idx])
}

/// Join a normalized directory path and an entry name.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
