//! Tool Execution Context
//!
//! One context per tool invocation. The workspace mode is an explicit
//! field here rather than process-global state, so concurrent
//! conversations in different modes never race: every tool observes the
//! mode of exactly the conversation that invoked it, at call time.

use std::sync::Arc;

use draftbench_core::WorkspaceMode;
use draftbench_storage::StorageBackend;

/// Context provided to each tool during execution.
#[derive(Clone)]
pub struct ToolContext {
    /// Owning conversation/session identifier
    pub session_id: String,
    /// Unique identifier for this specific tool call
    pub tool_call_id: String,
    /// Which backend is authoritative for this conversation
    pub mode: WorkspaceMode,
    /// The remote storage backend; untouched in local mode
    pub backend: Arc<dyn StorageBackend>,
}

impl ToolContext {
    pub fn new(
        session_id: impl Into<String>,
        tool_call_id: impl Into<String>,
        mode: WorkspaceMode,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            tool_call_id: tool_call_id.into(),
            mode,
            backend,
        }
    }

    /// Derive a context for another call in the same conversation.
    pub fn for_call(&self, tool_call_id: impl Into<String>) -> Self {
        Self {
            session_id: self.session_id.clone(),
            tool_call_id: tool_call_id.into(),
            mode: self.mode,
            backend: Arc::clone(&self.backend),
        }
    }
}
