//! Granted Directory Backend
//!
//! Models the browser's user-granted directory capability. The grant is
//! created by an explicit consent gesture, lives for the page session, is
//! never persisted, and can be silently revoked at any time — so every
//! single operation re-checks the grant and fails with `PermissionDenied`
//! instead of surfacing an unhandled capability error.
//!
//! `LocalDirHandle` is the raw capability surface; `FsDirHandle` is the
//! in-process implementation (a real directory plus a revocable grant
//! flag) used by the mirror engine and as the test double for the real
//! browser handle.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use draftbench_core::{CoreError, CoreResult, FileItem, FileKind};

use crate::backend::{StorageBackend, LIST_SNAPSHOT_MAX_BYTES};
use crate::paths;

/// Permission state of a directory grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantState {
    /// The capability is usable.
    Granted,
    /// The browser would need to re-prompt the user.
    Prompt,
    /// The user denied or revoked access.
    Denied,
}

/// Raw operations a granted directory capability exposes.
///
/// Paths passed to handle methods are already normalized and validated by
/// the backend wrapper; implementations only perform I/O.
#[async_trait]
pub trait LocalDirHandle: Send + Sync {
    /// Current grant state. Cheap; called before every operation.
    fn query_permission(&self) -> GrantState;

    /// Attempt to re-acquire the grant (a browser would prompt the user).
    fn request_permission(&self) -> GrantState {
        self.query_permission()
    }

    async fn read_file(&self, path: &str) -> CoreResult<String>;
    async fn write_file(&self, path: &str, content: &str) -> CoreResult<()>;
    async fn make_dir(&self, path: &str) -> CoreResult<()>;
    async fn remove(&self, path: &str) -> CoreResult<()>;
    async fn list_dir(&self, path: &str) -> CoreResult<Vec<FileItem>>;
    async fn exists(&self, path: &str) -> CoreResult<bool>;
}

/// Storage backend over a granted local directory handle.
pub struct GrantedDirBackend {
    handle: Arc<dyn LocalDirHandle>,
}

impl GrantedDirBackend {
    pub fn new(handle: Arc<dyn LocalDirHandle>) -> Self {
        Self { handle }
    }

    /// Confirm the grant is live, attempting one re-request when the
    /// browser reports it would prompt.
    fn check_grant(&self) -> CoreResult<()> {
        match self.handle.query_permission() {
            GrantState::Granted => Ok(()),
            GrantState::Prompt => match self.handle.request_permission() {
                GrantState::Granted => Ok(()),
                _ => {
                    warn!("local directory grant not re-acquired");
                    Err(CoreError::permission_denied(
                        "local directory access was not granted",
                    ))
                }
            },
            GrantState::Denied => Err(CoreError::permission_denied(
                "local directory access was revoked",
            )),
        }
    }
}

#[async_trait]
impl StorageBackend for GrantedDirBackend {
    fn name(&self) -> &'static str {
        "granted-dir"
    }

    async fn create(
        &self,
        path: &str,
        kind: FileKind,
        content: Option<&str>,
    ) -> CoreResult<FileItem> {
        self.check_grant()?;
        let normalized = paths::normalize_path(path)?;
        match kind {
            FileKind::Directory => {
                self.handle.make_dir(&normalized).await?;
                Ok(FileItem::directory(normalized))
            }
            FileKind::File => {
                let content = content.unwrap_or_default();
                self.handle.write_file(&normalized, content).await?;
                debug!(path = %normalized, bytes = content.len(), "created local file");
                Ok(FileItem::file(normalized, Some(content.to_string())))
            }
        }
    }

    async fn read(&self, path: &str) -> CoreResult<String> {
        self.check_grant()?;
        let normalized = paths::normalize_path(path)?;
        self.handle.read_file(&normalized).await
    }

    async fn update(&self, path: &str, content: &str) -> CoreResult<()> {
        self.check_grant()?;
        let normalized = paths::normalize_path(path)?;
        if !self.handle.exists(&normalized).await? {
            debug!(path = %normalized, "local update target missing; auto-creating");
        }
        self.handle.write_file(&normalized, content).await
    }

    async fn delete(&self, path: &str) -> CoreResult<()> {
        self.check_grant()?;
        let normalized = paths::normalize_path(path)?;
        self.handle.remove(&normalized).await
    }

    async fn list(&self, path: Option<&str>) -> CoreResult<Vec<FileItem>> {
        self.check_grant()?;
        let normalized = paths::normalize_dir_path(path)?;
        self.handle.list_dir(&normalized).await
    }

    async fn exists(&self, path: &str) -> CoreResult<bool> {
        self.check_grant()?;
        let normalized = paths::normalize_path(path)?;
        self.handle.exists(&normalized).await
    }
}

// ============================================================================
// FsDirHandle
// ============================================================================

const STATE_GRANTED: u8 = 0;
const STATE_PROMPT: u8 = 1;
const STATE_DENIED: u8 = 2;

/// In-process directory handle with a revocable grant.
///
/// Stands in for the browser's directory handle: the same raw operations,
/// plus `revoke()`/`grant()` to simulate the browser silently dropping the
/// permission mid-session.
pub struct FsDirHandle {
    root: PathBuf,
    state: AtomicU8,
}

impl FsDirHandle {
    /// Create a granted handle over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: AtomicU8::new(STATE_GRANTED),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Simulate the browser revoking the grant.
    pub fn revoke(&self) {
        self.state.store(STATE_DENIED, Ordering::SeqCst);
    }

    /// Move the grant to the would-prompt state.
    pub fn require_prompt(&self) {
        self.state.store(STATE_PROMPT, Ordering::SeqCst);
    }

    /// Re-grant access.
    pub fn grant(&self) {
        self.state.store(STATE_GRANTED, Ordering::SeqCst);
    }

    fn abs(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl LocalDirHandle for FsDirHandle {
    fn query_permission(&self) -> GrantState {
        match self.state.load(Ordering::SeqCst) {
            STATE_GRANTED => GrantState::Granted,
            STATE_PROMPT => GrantState::Prompt,
            _ => GrantState::Denied,
        }
    }

    async fn read_file(&self, path: &str) -> CoreResult<String> {
        let abs = self.abs(path);
        if !abs.is_file() {
            return Err(CoreError::not_found(path.to_string()));
        }
        Ok(tokio::fs::read_to_string(&abs).await?)
    }

    async fn write_file(&self, path: &str, content: &str) -> CoreResult<()> {
        let abs = self.abs(path);
        if let Some(parent) = abs.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&abs, content).await?;
        Ok(())
    }

    async fn make_dir(&self, path: &str) -> CoreResult<()> {
        tokio::fs::create_dir_all(self.abs(path)).await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> CoreResult<()> {
        let abs = self.abs(path);
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

    async fn list_dir(&self, path: &str) -> CoreResult<Vec<FileItem>> {
        let abs = self.abs(path);
        if !abs.exists() {
            if path.is_empty() {
                return Ok(Vec::new());
            }
            return Err(CoreError::not_found(path.to_string()));
        }

        let mut items = Vec::new();
        let mut entries = tokio::fs::read_dir(&abs).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let entry_path = paths::join(path, &name);
            let metadata = entry.metadata().await?;
            if metadata.is_dir() {
                items.push(FileItem::directory(entry_path));
            } else {
                let content = if metadata.len() <= LIST_SNAPSHOT_MAX_BYTES {
                    tokio::fs::read_to_string(entry.path()).await.ok()
                } else {
                    None
                };
                items.push(FileItem::file(entry_path, content));
            }
        }
        items.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(items)
    }

    async fn exists(&self, path: &str) -> CoreResult<bool> {
        Ok(self.abs(path).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend() -> (TempDir, Arc<FsDirHandle>, GrantedDirBackend) {
        let dir = TempDir::new().unwrap();
        let handle = Arc::new(FsDirHandle::new(dir.path()));
        let backend = GrantedDirBackend::new(handle.clone());
        (dir, handle, backend)
    }

    #[tokio::test]
    async fn test_granted_create_and_read() {
        let (_dir, _handle, backend) = backend();
        backend
            .create("index.html", FileKind::File, Some("<body></body>"))
            .await
            .unwrap();
        assert_eq!(
            backend.read("index.html").await.unwrap(),
            "<body></body>"
        );
    }

    #[tokio::test]
    async fn test_revoked_grant_denies_every_operation() {
        let (_dir, handle, backend) = backend();
        backend
            .create("a.txt", FileKind::File, Some("x"))
            .await
            .unwrap();

        handle.revoke();
        assert!(matches!(
            backend.read("a.txt").await.unwrap_err(),
            CoreError::PermissionDenied(_)
        ));
        assert!(matches!(
            backend.update("a.txt", "y").await.unwrap_err(),
            CoreError::PermissionDenied(_)
        ));
        assert!(matches!(
            backend.delete("a.txt").await.unwrap_err(),
            CoreError::PermissionDenied(_)
        ));
        assert!(matches!(
            backend.list(None).await.unwrap_err(),
            CoreError::PermissionDenied(_)
        ));
    }

    #[tokio::test]
    async fn test_prompt_state_re_requests_grant() {
        let (_dir, handle, backend) = backend();
        handle.require_prompt();
        // FsDirHandle's request_permission reports the same state, so the
        // re-request fails; a real browser handle may succeed here.
        assert!(matches!(
            backend.list(None).await.unwrap_err(),
            CoreError::PermissionDenied(_)
        ));

        handle.grant();
        assert!(backend.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_path_validation_applies_independently() {
        let (_dir, _handle, backend) = backend();
        let err = backend.read("../outside").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_update_auto_vivifies() {
        let (_dir, _handle, backend) = backend();
        backend.update("fresh.txt", "hello").await.unwrap();
        assert_eq!(backend.read("fresh.txt").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_list_snapshots_files() {
        let (_dir, _handle, backend) = backend();
        backend
            .create("style.css", FileKind::File, Some("body {}"))
            .await
            .unwrap();
        backend
            .create("pages", FileKind::Directory, None)
            .await
            .unwrap();

        let items = backend.list(None).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.path == "style.css"
            && i.content.as_deref() == Some("body {}")));
        assert!(items.iter().any(|i| i.path == "pages" && i.is_directory()));
    }
}
