//! Disk Backend
//!
//! Server-side workspace backend rooted at a directory on the process
//! filesystem. All paths are validated against the workspace root before
//! any I/O; the root itself is created lazily on first write.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use draftbench_core::{CoreError, CoreResult, FileItem, FileKind};

use crate::backend::{StorageBackend, LIST_SNAPSHOT_MAX_BYTES};
use crate::paths;

/// Filesystem-rooted storage backend.
pub struct DiskBackend {
    root: PathBuf,
}

impl DiskBackend {
    /// Create a backend rooted at `root`. The directory need not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a validated workspace path to an absolute filesystem path.
    fn resolve(&self, path: &str) -> CoreResult<PathBuf> {
        let normalized = paths::normalize_path(path)?;
        Ok(self.root.join(normalized))
    }

    fn resolve_dir(&self, path: Option<&str>) -> CoreResult<(PathBuf, String)> {
        let normalized = paths::normalize_dir_path(path)?;
        let abs = if normalized.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&normalized)
        };
        Ok((abs, normalized))
    }

    async fn ensure_parent(&self, abs: &Path) -> CoreResult<()> {
        if let Some(parent) = abs.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn snapshot_content(abs: &Path, size: u64) -> Option<String> {
        if size > LIST_SNAPSHOT_MAX_BYTES {
            return None;
        }
        // Binary files fail UTF-8 conversion and list without a snapshot.
        tokio::fs::read_to_string(abs).await.ok()
    }
}

#[async_trait]
impl StorageBackend for DiskBackend {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn create(
        &self,
        path: &str,
        kind: FileKind,
        content: Option<&str>,
    ) -> CoreResult<FileItem> {
        let normalized = paths::normalize_path(path)?;
        let abs = self.root.join(&normalized);

        match kind {
            FileKind::Directory => {
                tokio::fs::create_dir_all(&abs).await?;
                debug!(backend = self.name(), path = %normalized, "created directory");
                Ok(FileItem::directory(normalized))
            }
            FileKind::File => {
                self.ensure_parent(&abs).await?;
                let content = content.unwrap_or_default();
                tokio::fs::write(&abs, content).await?;
                debug!(
                    backend = self.name(),
                    path = %normalized,
                    bytes = content.len(),
                    "created file"
                );
                Ok(FileItem::file(normalized, Some(content.to_string())))
            }
        }
    }

    async fn read(&self, path: &str) -> CoreResult<String> {
        let abs = self.resolve(path)?;
        if !abs.is_file() {
            return Err(CoreError::not_found(path.to_string()));
        }
        Ok(tokio::fs::read_to_string(&abs).await?)
    }

    async fn update(&self, path: &str, content: &str) -> CoreResult<()> {
        let normalized = paths::normalize_path(path)?;
        let abs = self.root.join(&normalized);
        if !abs.exists() {
            debug!(
                backend = self.name(),
                path = %normalized,
                "update target missing; auto-creating"
            );
        }
        self.ensure_parent(&abs).await?;
        tokio::fs::write(&abs, content).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> CoreResult<()> {
        let abs = self.resolve(path)?;
        if abs.is_dir() {
            tokio::fs::remove_dir_all(&abs).await?;
            return Ok(());
        }
        if !abs.is_file() {
            return Err(CoreError::not_found(path.to_string()));
        }
        tokio::fs::remove_file(&abs).await?;
        Ok(())
    }

    async fn list(&self, path: Option<&str>) -> CoreResult<Vec<FileItem>> {
        let (abs, normalized) = self.resolve_dir(path)?;
        if !abs.exists() {
            // An empty workspace root lists as empty, not NotFound.
            if normalized.is_empty() {
                return Ok(Vec::new());
            }
            return Err(CoreError::not_found(normalized));
        }

        let mut items = Vec::new();
        let mut entries = tokio::fs::read_dir(&abs).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let entry_path = paths::join(&normalized, &name);
            let metadata = entry.metadata().await?;
            if metadata.is_dir() {
                items.push(FileItem::directory(entry_path));
            } else {
                let content = Self::snapshot_content(&entry.path(), metadata.len()).await;
                items.push(FileItem::file(entry_path, content));
            }
        }
        items.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(items)
    }

    async fn exists(&self, path: &str) -> CoreResult<bool> {
        let abs = self.resolve(path)?;
        Ok(abs.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend() -> (TempDir, DiskBackend) {
        let dir = TempDir::new().unwrap();
        let backend = DiskBackend::new(dir.path());
        (dir, backend)
    }

    #[tokio::test]
    async fn test_create_then_read_round_trips() {
        let (_dir, backend) = backend();
        backend
            .create("welcome.html", FileKind::File, Some("<h1>Hi</h1>"))
            .await
            .unwrap();
        let content = backend.read("welcome.html").await.unwrap();
        assert_eq!(content, "<h1>Hi</h1>");
    }

    #[tokio::test]
    async fn test_create_makes_missing_parents() {
        let (_dir, backend) = backend();
        let item = backend
            .create("src/pages/index.html", FileKind::File, Some("x"))
            .await
            .unwrap();
        assert_eq!(item.path, "src/pages/index.html");
        assert!(backend.exists("src/pages/index.html").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_paths_rejected_without_io() {
        let (dir, backend) = backend();
        for bad in ["../escape.txt", "/etc/passwd", "a/../../b", "C:/x"] {
            let err = backend.read(bad).await.unwrap_err();
            assert!(matches!(err, CoreError::InvalidPath(_)), "path: {}", bad);
        }
        // Nothing was created outside or inside the root.
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_dir, backend) = backend();
        let err = backend.read("missing.txt").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_auto_vivifies_missing_file() {
        let (_dir, backend) = backend();
        backend.update("notes.md", "draft").await.unwrap();
        assert_eq!(backend.read("notes.md").await.unwrap(), "draft");

        // Idempotent: updating with the same content leaves state unchanged.
        backend.update("notes.md", "draft").await.unwrap();
        assert_eq!(backend.read("notes.md").await.unwrap(), "draft");
    }

    #[tokio::test]
    async fn test_delete_then_read_is_not_found() {
        let (_dir, backend) = backend();
        backend
            .create("tmp.txt", FileKind::File, Some("x"))
            .await
            .unwrap();
        backend.delete("tmp.txt").await.unwrap();
        let err = backend.read("tmp.txt").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (_dir, backend) = backend();
        let err = backend.delete("missing.txt").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_returns_one_level_with_snapshots() {
        let (_dir, backend) = backend();
        backend
            .create("a.txt", FileKind::File, Some("alpha"))
            .await
            .unwrap();
        backend
            .create("src/main.rs", FileKind::File, Some("fn main() {}"))
            .await
            .unwrap();

        let items = backend.list(None).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path, "a.txt");
        assert_eq!(items[0].content.as_deref(), Some("alpha"));
        assert_eq!(items[1].path, "src");
        assert!(items[1].is_directory());
        assert!(items[1].content.is_none());

        let nested = backend.list(Some("src")).await.unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].path, "src/main.rs");
    }

    #[tokio::test]
    async fn test_list_empty_root_is_empty() {
        let (_dir, backend) = backend();
        assert!(backend.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_not_found() {
        let (_dir, backend) = backend();
        let err = backend.list(Some("nope")).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_directory() {
        let (_dir, backend) = backend();
        let item = backend
            .create("assets", FileKind::Directory, None)
            .await
            .unwrap();
        assert!(item.is_directory());
        assert!(backend.exists("assets").await.unwrap());
    }
}
