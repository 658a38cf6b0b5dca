//! Tool Outcomes
//!
//! The result value every file tool returns. Modeled as a tagged union per
//! operation rather than one record with many optional fields, so the
//! compiler enforces which fields each operation carries.
//!
//! In local mode an outcome doubles as a write instruction: `local = true`
//! means "not yet durably applied — the client must apply it", and the
//! mirror engine consumes it exactly once as a `PendingLocalWrite`.

use serde::{Deserialize, Serialize};

/// The five mediated file operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl FileOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileOperation::Create => "create",
            FileOperation::Read => "read",
            FileOperation::Update => "update",
            FileOperation::Delete => "delete",
            FileOperation::List => "list",
        }
    }
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a single tool execution.
///
/// Success variants for create/update/read always carry the full file
/// content so a local-mode client can materialize the write without a
/// second round trip. Failures carry a human-readable message the model
/// can react to in natural language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// createFile succeeded (or, in local mode, was relayed)
    Created {
        file_name: String,
        /// Full file content, never truncated
        content: String,
        message: String,
        /// True when the write has not been applied by the server and the
        /// client must perform it against the granted local directory
        local: bool,
    },
    /// updateFile succeeded (or was relayed)
    Updated {
        file_name: String,
        content: String,
        message: String,
        local: bool,
    },
    /// readFile succeeded (remote mode only)
    Read {
        file_name: String,
        content: String,
        message: String,
    },
    /// listFiles succeeded (remote mode only)
    Listed {
        #[serde(skip_serializing_if = "Option::is_none")]
        directory: Option<String>,
        files: Vec<String>,
        directories: Vec<String>,
        message: String,
    },
    /// deleteFile succeeded (or was relayed)
    Deleted {
        file_name: String,
        message: String,
        local: bool,
    },
    /// The operation failed; the conversation continues
    Failure { error: String },
}

/// A typed command value: a write the client alone can perform against the
/// user-granted local directory. Produced from a local-mode outcome and
/// consumed exactly once by the mirror engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingLocalWrite {
    pub operation: FileOperation,
    pub file_name: String,
    /// Present for create/update, absent for delete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ToolOutcome {
    /// Create a failure outcome from any displayable error.
    pub fn failure(error: impl std::fmt::Display) -> Self {
        ToolOutcome::Failure {
            error: error.to_string(),
        }
    }

    /// Which operation produced this outcome. `None` for failures, which
    /// do not identify an operation on the wire.
    pub fn operation(&self) -> Option<FileOperation> {
        match self {
            ToolOutcome::Created { .. } => Some(FileOperation::Create),
            ToolOutcome::Updated { .. } => Some(FileOperation::Update),
            ToolOutcome::Read { .. } => Some(FileOperation::Read),
            ToolOutcome::Listed { .. } => Some(FileOperation::List),
            ToolOutcome::Deleted { .. } => Some(FileOperation::Delete),
            ToolOutcome::Failure { .. } => None,
        }
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        !matches!(self, ToolOutcome::Failure { .. })
    }

    /// Whether the outcome is a not-yet-applied local-mode instruction.
    pub fn is_local(&self) -> bool {
        match self {
            ToolOutcome::Created { local, .. }
            | ToolOutcome::Updated { local, .. }
            | ToolOutcome::Deleted { local, .. } => *local,
            _ => false,
        }
    }

    /// File name the outcome refers to, when the operation targets one.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            ToolOutcome::Created { file_name, .. }
            | ToolOutcome::Updated { file_name, .. }
            | ToolOutcome::Read { file_name, .. }
            | ToolOutcome::Deleted { file_name, .. } => Some(file_name),
            _ => None,
        }
    }

    /// Failure message, if this is a failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            ToolOutcome::Failure { error } => Some(error),
            _ => None,
        }
    }

    /// Extract the local write instruction, if any.
    ///
    /// Returns `Some` only for local-mode create/update/delete outcomes.
    /// Read/list never had server-side truth in local mode, so there is
    /// nothing to mirror.
    pub fn pending_local_write(&self) -> Option<PendingLocalWrite> {
        match self {
            ToolOutcome::Created {
                file_name,
                content,
                local: true,
                ..
            } => Some(PendingLocalWrite {
                operation: FileOperation::Create,
                file_name: file_name.clone(),
                content: Some(content.clone()),
            }),
            ToolOutcome::Updated {
                file_name,
                content,
                local: true,
                ..
            } => Some(PendingLocalWrite {
                operation: FileOperation::Update,
                file_name: file_name.clone(),
                content: Some(content.clone()),
            }),
            ToolOutcome::Deleted {
                file_name,
                local: true,
                ..
            } => Some(PendingLocalWrite {
                operation: FileOperation::Delete,
                file_name: file_name.clone(),
                content: None,
            }),
            _ => None,
        }
    }

    /// Render the outcome as text for the model's tool-result message.
    pub fn to_model_content(&self) -> String {
        match self {
            ToolOutcome::Created { message, .. }
            | ToolOutcome::Updated { message, .. }
            | ToolOutcome::Deleted { message, .. } => message.clone(),
            ToolOutcome::Read { content, .. } => content.clone(),
            ToolOutcome::Listed {
                files,
                directories,
                message,
                ..
            } => {
                let mut lines = vec![message.clone()];
                for dir in directories {
                    lines.push(format!("{}/", dir));
                }
                lines.extend(files.iter().cloned());
                lines.join("\n")
            }
            ToolOutcome::Failure { error } => format!("Error: {}", error),
        }
    }

    /// Serialize to the stable wire shape the model is prompted with:
    /// `{success, fileName, message, content?, files?, directories?, error?}`
    /// plus the `localOperation` flag the client mirror keys on.
    pub fn wire_json(&self) -> serde_json::Value {
        match self {
            ToolOutcome::Created {
                file_name,
                content,
                message,
                local,
            }
            | ToolOutcome::Updated {
                file_name,
                content,
                message,
                local,
            } => serde_json::json!({
                "success": true,
                "fileName": file_name,
                "message": message,
                "content": content,
                "localOperation": local,
                "operation": self.operation().map(|op| op.as_str()),
            }),
            ToolOutcome::Read {
                file_name,
                content,
                message,
            } => serde_json::json!({
                "success": true,
                "fileName": file_name,
                "content": content,
                "message": message,
                "localOperation": false,
                "operation": "read",
            }),
            ToolOutcome::Listed {
                directory,
                files,
                directories,
                message,
            } => serde_json::json!({
                "success": true,
                "directory": directory,
                "files": files,
                "directories": directories,
                "message": message,
                "localOperation": false,
                "operation": "list",
            }),
            ToolOutcome::Deleted {
                file_name,
                message,
                local,
            } => serde_json::json!({
                "success": true,
                "fileName": file_name,
                "message": message,
                "localOperation": local,
                "operation": "delete",
            }),
            ToolOutcome::Failure { error } => serde_json::json!({
                "success": false,
                "error": error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_mapping() {
        let outcome = ToolOutcome::Created {
            file_name: "a.txt".into(),
            content: "x".into(),
            message: "created".into(),
            local: false,
        };
        assert_eq!(outcome.operation(), Some(FileOperation::Create));
        assert!(outcome.is_success());
        assert!(!outcome.is_local());
        assert_eq!(outcome.file_name(), Some("a.txt"));
    }

    #[test]
    fn test_failure_has_no_operation() {
        let outcome = ToolOutcome::failure("boom");
        assert_eq!(outcome.operation(), None);
        assert!(!outcome.is_success());
        assert_eq!(outcome.error(), Some("boom"));
        assert_eq!(outcome.to_model_content(), "Error: boom");
    }

    #[test]
    fn test_pending_local_write_for_local_update() {
        let outcome = ToolOutcome::Updated {
            file_name: "index.html".into(),
            content: "<body></body>".into(),
            message: "relayed".into(),
            local: true,
        };
        let write = outcome.pending_local_write().unwrap();
        assert_eq!(write.operation, FileOperation::Update);
        assert_eq!(write.file_name, "index.html");
        assert_eq!(write.content.as_deref(), Some("<body></body>"));
    }

    #[test]
    fn test_pending_local_write_for_local_delete() {
        let outcome = ToolOutcome::Deleted {
            file_name: "old.css".into(),
            message: "relayed".into(),
            local: true,
        };
        let write = outcome.pending_local_write().unwrap();
        assert_eq!(write.operation, FileOperation::Delete);
        assert!(write.content.is_none());
    }

    #[test]
    fn test_no_pending_write_for_remote_outcomes() {
        let outcome = ToolOutcome::Created {
            file_name: "a.txt".into(),
            content: "x".into(),
            message: "created".into(),
            local: false,
        };
        assert!(outcome.pending_local_write().is_none());

        let outcome = ToolOutcome::Read {
            file_name: "a.txt".into(),
            content: "x".into(),
            message: "read".into(),
        };
        assert!(outcome.pending_local_write().is_none());
    }

    #[test]
    fn test_wire_json_shapes() {
        let outcome = ToolOutcome::Created {
            file_name: "welcome.html".into(),
            content: "<h1>Hi</h1>".into(),
            message: "Created welcome.html".into(),
            local: true,
        };
        let wire = outcome.wire_json();
        assert_eq!(wire["success"], true);
        assert_eq!(wire["fileName"], "welcome.html");
        assert_eq!(wire["content"], "<h1>Hi</h1>");
        assert_eq!(wire["localOperation"], true);

        let outcome = ToolOutcome::Listed {
            directory: None,
            files: vec!["a.txt".into()],
            directories: vec!["src".into()],
            message: "1 file, 1 directory".into(),
        };
        let wire = outcome.wire_json();
        assert_eq!(wire["files"][0], "a.txt");
        assert_eq!(wire["directories"][0], "src");

        let wire = ToolOutcome::failure("NotFound: missing.txt").wire_json();
        assert_eq!(wire["success"], false);
        assert!(wire["error"].as_str().unwrap().contains("NotFound"));
    }

    #[test]
    fn test_listed_model_content_lists_entries() {
        let outcome = ToolOutcome::Listed {
            directory: Some("src".into()),
            files: vec!["main.rs".into()],
            directories: vec!["pages".into()],
            message: "Listed src".into(),
        };
        let text = outcome.to_model_content();
        assert!(text.contains("pages/"));
        assert!(text.contains("main.rs"));
    }

    #[test]
    fn test_serde_round_trip() {
        let outcome = ToolOutcome::Deleted {
            file_name: "tmp.txt".into(),
            message: "deleted".into(),
            local: false,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"outcome\":\"deleted\""));
        let parsed: ToolOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcome);
    }
}
