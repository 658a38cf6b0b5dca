//! createFile Tool

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use draftbench_core::{FileKind, ToolOutcome};

use super::{preview, required_str};
use crate::context::ToolContext;
use crate::trait_def::Tool;

/// Creates a file in the workspace, with mkdir -p semantics for missing
/// parent directories.
pub struct CreateFileTool;

#[async_trait]
impl Tool for CreateFileTool {
    fn name(&self) -> &str {
        "createFile"
    }

    fn description(&self) -> &str {
        "Create a new file in the workspace with the given content. Parent directories are \
         created automatically. Overwrites an existing file at the same path."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "fileName": {
                    "type": "string",
                    "description": "Path of the file to create, relative to the workspace root"
                },
                "content": {
                    "type": "string",
                    "description": "Complete content of the new file"
                },
                "reason": {
                    "type": "string",
                    "description": "Short explanation of why the file is being created"
                }
            },
            "required": ["fileName", "content", "reason"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> ToolOutcome {
        let file_name = match required_str(&args, "createFile", "fileName") {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };
        let content = match required_str(&args, "createFile", "content") {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };
        let reason = args
            .get("reason")
            .and_then(|v| v.as_str())
            .unwrap_or("no reason given");

        // Local mode: never touch the backend. Echo the full content back
        // so the client can materialize the write itself.
        if ctx.mode.is_local() {
            debug!(session = %ctx.session_id, file = file_name, "relaying local create");
            return ToolOutcome::Created {
                file_name: file_name.to_string(),
                content: content.to_string(),
                message: format!(
                    "Queued local create of {} ({}); apply on the client",
                    file_name, reason
                ),
                local: true,
            };
        }

        match ctx
            .backend
            .create(file_name, FileKind::File, Some(content))
            .await
        {
            Ok(item) => ToolOutcome::Created {
                file_name: item.path,
                content: content.to_string(),
                message: format!(
                    "Created {} ({} bytes): {}\nPreview: {}",
                    file_name,
                    content.len(),
                    reason,
                    preview(content)
                ),
                local: false,
            },
            Err(e) => ToolOutcome::failure(e),
        }
    }
}
