//! deleteFile Tool

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use draftbench_core::ToolOutcome;

use super::required_str;
use crate::context::ToolContext;
use crate::trait_def::Tool;

/// Deletes a file from the workspace.
pub struct DeleteFileTool;

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &str {
        "deleteFile"
    }

    fn description(&self) -> &str {
        "Delete a file from the workspace."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "fileName": {
                    "type": "string",
                    "description": "Path of the file to delete, relative to the workspace root"
                },
                "reason": {
                    "type": "string",
                    "description": "Short explanation of why the file is being deleted"
                }
            },
            "required": ["fileName", "reason"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> ToolOutcome {
        let file_name = match required_str(&args, "deleteFile", "fileName") {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };
        let reason = args
            .get("reason")
            .and_then(|v| v.as_str())
            .unwrap_or("no reason given");

        if ctx.mode.is_local() {
            debug!(session = %ctx.session_id, file = file_name, "relaying local delete");
            return ToolOutcome::Deleted {
                file_name: file_name.to_string(),
                message: format!(
                    "Queued local delete of {} ({}); apply on the client",
                    file_name, reason
                ),
                local: true,
            };
        }

        match ctx.backend.delete(file_name).await {
            Ok(()) => ToolOutcome::Deleted {
                file_name: file_name.to_string(),
                message: format!("Deleted {}: {}", file_name, reason),
                local: false,
            },
            Err(e) => ToolOutcome::failure(e),
        }
    }
}
