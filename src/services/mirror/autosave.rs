//! Autosave Scheduler
//!
//! Per-file debounced writes: rapid edits collapse into one storage write
//! after a quiet period. Each file path owns one cancellation token; a
//! new edit cancels the previous timer for that path only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use draftbench_core::FileKind;
use draftbench_storage::StorageBackend;

use crate::utils::AppResult;

/// Default quiet period before a scheduled save fires.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(2);

struct PendingSave {
    token: CancellationToken,
    content: String,
    generation: u64,
}

/// Debounced autosave over a storage backend.
pub struct AutosaveScheduler {
    backend: Arc<dyn StorageBackend>,
    delay: Duration,
    pending: Arc<Mutex<HashMap<String, PendingSave>>>,
    generations: Mutex<u64>,
}

impl AutosaveScheduler {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_delay(backend, DEFAULT_AUTOSAVE_DELAY)
    }

    pub fn with_delay(backend: Arc<dyn StorageBackend>, delay: Duration) -> Self {
        Self {
            backend,
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generations: Mutex::new(0),
        }
    }

    fn lock<'a, T>(m: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        match m.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn next_generation(&self) -> u64 {
        let mut counter = Self::lock(&self.generations);
        *counter += 1;
        *counter
    }

    /// Whether a save is pending for a file.
    pub fn is_pending(&self, file_name: &str) -> bool {
        Self::lock(&self.pending).contains_key(file_name)
    }

    /// Schedule a save of `content` after the quiet period. A prior
    /// pending save for the same file is cancelled and replaced; other
    /// files' timers are untouched.
    pub fn schedule(&self, file_name: &str, content: impl Into<String>) {
        let content = content.into();
        let token = CancellationToken::new();
        let generation = self.next_generation();

        {
            let mut pending = Self::lock(&self.pending);
            if let Some(previous) = pending.insert(
                file_name.to_string(),
                PendingSave {
                    token: token.clone(),
                    content: content.clone(),
                    generation,
                },
            ) {
                previous.token.cancel();
            }
        }

        let backend = Arc::clone(&self.backend);
        let pending = Arc::clone(&self.pending);
        let delay = self.delay;
        let file = file_name.to_string();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = sleep(delay) => {
                    // Only fire if this timer is still the current one.
                    let current = {
                        let mut guard = match pending.lock() {
                            Ok(guard) => guard,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        match guard.get(&file) {
                            Some(save) if save.generation == generation => {
                                guard.remove(&file)
                            }
                            _ => None,
                        }
                    };
                    if let Some(save) = current {
                        debug!(file = %file, "autosave firing");
                        if let Err(e) = backend
                            .create(&file, FileKind::File, Some(&save.content))
                            .await
                        {
                            warn!(file = %file, error = %e, "autosave write failed");
                        }
                    }
                }
            }
        });
    }

    /// Save immediately: cancels the pending timer and writes the most
    /// recently scheduled content (or `latest` when provided).
    pub async fn flush(&self, file_name: &str, latest: Option<String>) -> AppResult<bool> {
        let pending = {
            let mut guard = Self::lock(&self.pending);
            guard.remove(file_name)
        };

        let content = match (latest, pending) {
            (Some(content), Some(save)) => {
                save.token.cancel();
                Some(content)
            }
            (Some(content), None) => Some(content),
            (None, Some(save)) => {
                save.token.cancel();
                Some(save.content)
            }
            (None, None) => None,
        };

        match content {
            Some(content) => {
                self.backend
                    .create(file_name, FileKind::File, Some(&content))
                    .await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Discard any pending save without writing (file closed without
    /// keeping changes).
    pub fn close(&self, file_name: &str) {
        let mut pending = Self::lock(&self.pending);
        if let Some(save) = pending.remove(file_name) {
            save.token.cancel();
            debug!(file = %file_name, "pending autosave discarded");
        }
    }
}
