//! File Item Model
//!
//! The entry type returned by storage backends and cached by the editor.
//! Paths are always slash-separated and relative to the workspace root;
//! the storage layer rejects anything else before I/O.

use serde::{Deserialize, Serialize};

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::File => write!(f, "file"),
            FileKind::Directory => write!(f, "directory"),
        }
    }
}

/// A single workspace entry.
///
/// `content` is present only for files that have been read (or eagerly
/// snapshotted by `list` on cheap-read backends); it is always `None` for
/// directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileItem {
    /// Entry name (last path segment)
    pub name: String,
    /// File or directory
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Slash-separated path relative to the workspace root
    pub path: String,
    /// Content snapshot, files only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FileItem {
    /// Create a file entry.
    pub fn file(path: impl Into<String>, content: Option<String>) -> Self {
        let path = path.into();
        Self {
            name: Self::name_of(&path),
            kind: FileKind::File,
            path,
            content,
        }
    }

    /// Create a directory entry. Directories never carry content.
    pub fn directory(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: Self::name_of(&path),
            kind: FileKind::Directory,
            path,
            content: None,
        }
    }

    /// Whether this entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }

    fn name_of(path: &str) -> String {
        path.rsplit('/').next().unwrap_or(path).to_string()
    }
}
