//! Workspace Mode
//!
//! The mode flag selecting which storage backend is authoritative for a
//! conversation. Mode is deliberately NOT process-global: it is carried as
//! an explicit field on every `ChatRequest` and every tool invocation
//! context, and tools observe it strictly at call time. This eliminates
//! cross-session races entirely — two concurrent conversations can run in
//! different modes within one process.

use serde::{Deserialize, Serialize};

/// Which backend is authoritative for the current conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceMode {
    /// The backend process owns a storage backend and executes file
    /// operations directly.
    #[default]
    Remote,
    /// The backend process cannot see the user's real files; mutations are
    /// relayed as instructions for the browser to apply via a user-granted
    /// local directory capability.
    Local,
}

impl WorkspaceMode {
    /// Whether file mutations must be relayed to the client for application.
    pub fn is_local(&self) -> bool {
        matches!(self, WorkspaceMode::Local)
    }

    /// Whether the orchestrator process executes file operations directly.
    pub fn is_remote(&self) -> bool {
        matches!(self, WorkspaceMode::Remote)
    }
}

impl std::fmt::Display for WorkspaceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkspaceMode::Remote => write!(f, "remote"),
            WorkspaceMode::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_remote() {
        assert_eq!(WorkspaceMode::default(), WorkspaceMode::Remote);
    }

    #[test]
    fn test_mode_predicates() {
        assert!(WorkspaceMode::Local.is_local());
        assert!(!WorkspaceMode::Local.is_remote());
        assert!(WorkspaceMode::Remote.is_remote());
        assert!(!WorkspaceMode::Remote.is_local());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&WorkspaceMode::Local).unwrap(),
            "\"local\""
        );
        let parsed: WorkspaceMode = serde_json::from_str("\"remote\"").unwrap();
        assert_eq!(parsed, WorkspaceMode::Remote);
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkspaceMode::Local.to_string(), "local");
        assert_eq!(WorkspaceMode::Remote.to_string(), "remote");
    }
}
