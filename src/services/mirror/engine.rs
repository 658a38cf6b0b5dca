//! Mirror Engine
//!
//! Client-side state keeper for local mode: applies the model's relayed
//! writes against the granted local directory, and reconciles the cached
//! file map and open editor buffers with authoritative storage.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

use draftbench_core::{FileKind, FileOperation, ToolOutcome};
use draftbench_storage::StorageBackend;

use crate::utils::AppResult;

/// Retry policy for `refresh_all_with_retry`.
const REFRESH_ATTEMPTS: usize = 3;
const REFRESH_BACKOFF: Duration = Duration::from_millis(250);

/// An open editor buffer.
#[derive(Debug, Clone)]
struct OpenBuffer {
    content: String,
    /// Unsaved user edits; a dirty buffer is never clobbered by a refresh.
    dirty: bool,
}

/// Client-side mirror of the workspace.
pub struct MirrorEngine<B: StorageBackend> {
    backend: B,
    /// Authoritative content as last observed, keyed by path.
    cache: Mutex<HashMap<String, String>>,
    open_buffers: Mutex<HashMap<String, OpenBuffer>>,
    /// Tool call ids whose pending writes were already applied.
    applied: Mutex<HashSet<String>>,
}

impl<B: StorageBackend> MirrorEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: Mutex::new(HashMap::new()),
            open_buffers: Mutex::new(HashMap::new()),
            applied: Mutex::new(HashSet::new()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn lock<'a, T>(m: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        match m.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Observe one tool result. Applies the pending local write, if the
    /// outcome carries one, exactly once per tool call id; re-observing
    /// the same id (event replay, reconnect) is a no-op.
    ///
    /// Returns whether a write was applied.
    pub async fn on_tool_result(&self, tool_id: &str, outcome: &ToolOutcome) -> AppResult<bool> {
        let Some(write) = outcome.pending_local_write() else {
            return Ok(false);
        };

        if Self::lock(&self.applied).contains(tool_id) {
            debug!(tool_id, "pending write already applied; skipping");
            return Ok(false);
        }

        match write.operation {
            FileOperation::Create | FileOperation::Update => {
                let content = write.content.unwrap_or_default();
                // create covers both: the granted store overwrites and
                // vivifies parents.
                self.backend
                    .create(&write.file_name, FileKind::File, Some(&content))
                    .await?;
                Self::lock(&self.cache).insert(write.file_name.clone(), content.clone());
                let mut buffers = Self::lock(&self.open_buffers);
                if let Some(buffer) = buffers.get_mut(&write.file_name) {
                    buffer.content = content;
                    buffer.dirty = false;
                }
            }
            FileOperation::Delete => {
                self.backend.delete(&write.file_name).await?;
                Self::lock(&self.cache).remove(&write.file_name);
                Self::lock(&self.open_buffers).remove(&write.file_name);
            }
            FileOperation::Read | FileOperation::List => {}
        }

        // Marked only after the write succeeded, so a denied grant can be
        // retried once re-granted.
        Self::lock(&self.applied).insert(tool_id.to_string());
        debug!(tool_id, file = %write.file_name, op = %write.operation, "applied local write");
        Ok(true)
    }

    /// Re-fetch one file and splice the authoritative content into the
    /// cache and the open buffer, but only when the bytes actually differ.
    ///
    /// Returns whether anything changed.
    pub async fn refresh_one(&self, file_name: &str) -> AppResult<bool> {
        let content = self.backend.read(file_name).await?;

        let changed = {
            let mut cache = Self::lock(&self.cache);
            match cache.get(file_name) {
                Some(existing) if *existing == content => false,
                _ => {
                    cache.insert(file_name.to_string(), content.clone());
                    true
                }
            }
        };

        if changed {
            let mut buffers = Self::lock(&self.open_buffers);
            if let Some(buffer) = buffers.get_mut(file_name) {
                if !buffer.dirty {
                    buffer.content = content;
                }
            }
        }

        Ok(changed)
    }

    /// Re-list the whole workspace, descending into directories, and merge
    /// into the cache. Files that disappeared from storage are dropped from
    /// the cache; open buffers with unsaved edits are preserved untouched.
    pub async fn refresh_all(&self) -> AppResult<()> {
        let mut fresh: HashMap<String, String> = HashMap::new();
        let mut elided: Vec<String> = Vec::new();
        let mut directories: VecDeque<Option<String>> = VecDeque::from([None]);

        while let Some(dir) = directories.pop_front() {
            let items = self.backend.list(dir.as_deref()).await?;
            for item in items {
                if item.is_directory() {
                    directories.push_back(Some(item.path));
                } else if let Some(content) = item.content {
                    fresh.insert(item.path, content);
                } else {
                    // Snapshot elided (file too large to list eagerly).
                    elided.push(item.path);
                }
            }
        }

        {
            let mut cache = Self::lock(&self.cache);
            // Elided files still exist in storage; keep their last
            // observed content instead of dropping them.
            for path in elided {
                if let Some(content) = cache.get(&path) {
                    fresh.insert(path, content.clone());
                }
            }
            *cache = fresh.clone();
        }

        let mut buffers = Self::lock(&self.open_buffers);
        for (path, buffer) in buffers.iter_mut() {
            if buffer.dirty {
                continue;
            }
            if let Some(content) = fresh.get(path) {
                if *content != buffer.content {
                    buffer.content = content.clone();
                }
            }
        }

        Ok(())
    }

    /// `refresh_all` with bounded retry. Exhaustion is non-fatal: the
    /// mirror keeps its last known state and the caller may retry later.
    ///
    /// Returns whether the refresh eventually succeeded.
    pub async fn refresh_all_with_retry(&self) -> bool {
        for attempt in 1..=REFRESH_ATTEMPTS {
            match self.refresh_all().await {
                Ok(()) => return true,
                Err(e) => {
                    warn!(attempt, error = %e, "workspace refresh failed");
                    if attempt < REFRESH_ATTEMPTS {
                        tokio::time::sleep(REFRESH_BACKOFF).await;
                    }
                }
            }
        }
        warn!(
            attempts = REFRESH_ATTEMPTS,
            "workspace refresh retries exhausted; keeping stale mirror"
        );
        false
    }

    // ========================================================================
    // Buffer management
    // ========================================================================

    /// Open a file in an editor buffer, seeding from cache when available.
    pub fn open_buffer(&self, file_name: &str, content: impl Into<String>) {
        Self::lock(&self.open_buffers).insert(
            file_name.to_string(),
            OpenBuffer {
                content: content.into(),
                dirty: false,
            },
        );
    }

    /// Record a user edit to an open buffer.
    pub fn edit_buffer(&self, file_name: &str, content: impl Into<String>) {
        let mut buffers = Self::lock(&self.open_buffers);
        if let Some(buffer) = buffers.get_mut(file_name) {
            buffer.content = content.into();
            buffer.dirty = true;
        }
    }

    /// Mark a buffer clean (after a successful save).
    pub fn mark_saved(&self, file_name: &str) {
        let mut buffers = Self::lock(&self.open_buffers);
        if let Some(buffer) = buffers.get_mut(file_name) {
            buffer.dirty = false;
        }
    }

    pub fn close_buffer(&self, file_name: &str) {
        Self::lock(&self.open_buffers).remove(file_name);
    }

    pub fn buffer_content(&self, file_name: &str) -> Option<String> {
        Self::lock(&self.open_buffers)
            .get(file_name)
            .map(|b| b.content.clone())
    }

    pub fn is_dirty(&self, file_name: &str) -> bool {
        Self::lock(&self.open_buffers)
            .get(file_name)
            .map(|b| b.dirty)
            .unwrap_or(false)
    }

    pub fn cached_content(&self, file_name: &str) -> Option<String> {
        Self::lock(&self.cache).get(file_name).cloned()
    }
}
