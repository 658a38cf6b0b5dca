//! Storage Backend Trait
//!
//! The uniform contract over a named hierarchical namespace. Implementors
//! must validate every path themselves (via [`crate::paths`]) before
//! touching storage — the two backends run on opposite sides of the
//! browser/server boundary and neither can rely on the other's checks.

use async_trait::async_trait;

use draftbench_core::{CoreResult, FileItem, FileKind};

/// Eager-read snapshot cap for `list`. Files larger than this list without
/// a content snapshot so the UI falls back to an explicit read.
pub const LIST_SNAPSHOT_MAX_BYTES: u64 = 512 * 1024;

/// Uniform file-operation contract over a workspace namespace.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Backend name for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Create a file or directory. Missing parent directories are created
    /// implicitly (mkdir -p semantics). Creating a file overwrites any
    /// existing file at the path (last write wins).
    async fn create(
        &self,
        path: &str,
        kind: FileKind,
        content: Option<&str>,
    ) -> CoreResult<FileItem>;

    /// Read a file's content. `NotFound` if the path does not exist.
    async fn read(&self, path: &str) -> CoreResult<String>;

    /// Replace a file's content. A missing file is auto-vivified with the
    /// given content rather than failing — explicit tolerance for the model
    /// calling update before create.
    async fn update(&self, path: &str, content: &str) -> CoreResult<()>;

    /// Delete a file or directory. `NotFound` if the path does not exist.
    async fn delete(&self, path: &str) -> CoreResult<()>;

    /// List one level of a directory (workspace root when `path` is None).
    /// Files carry an eager content snapshot when cheap to read;
    /// directories never do.
    async fn list(&self, path: Option<&str>) -> CoreResult<Vec<FileItem>>;

    /// Whether a path currently exists.
    async fn exists(&self, path: &str) -> CoreResult<bool>;
}
