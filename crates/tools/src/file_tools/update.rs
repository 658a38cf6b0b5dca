//! updateFile Tool

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use draftbench_core::{CoreError, FileKind, ToolOutcome};

use super::{preview, required_str};
use crate::context::ToolContext;
use crate::trait_def::Tool;

/// Replaces a file's content. In remote mode the tool probes for the file
/// first and creates it empty when missing, so an update never 404s even
/// when the model's picture of the workspace is stale.
pub struct UpdateFileTool;

#[async_trait]
impl Tool for UpdateFileTool {
    fn name(&self) -> &str {
        "updateFile"
    }

    fn description(&self) -> &str {
        "Replace the complete content of an existing file in the workspace. If the file does \
         not exist yet it is created first. Always provide the full new content, never a diff."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "fileName": {
                    "type": "string",
                    "description": "Path of the file to update, relative to the workspace root"
                },
                "content": {
                    "type": "string",
                    "description": "Complete new content of the file"
                },
                "reason": {
                    "type": "string",
                    "description": "Short explanation of the change"
                }
            },
            "required": ["fileName", "content", "reason"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> ToolOutcome {
        let file_name = match required_str(&args, "updateFile", "fileName") {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };
        let content = match required_str(&args, "updateFile", "content") {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };
        let reason = args
            .get("reason")
            .and_then(|v| v.as_str())
            .unwrap_or("no reason given");

        if ctx.mode.is_local() {
            debug!(session = %ctx.session_id, file = file_name, "relaying local update");
            return ToolOutcome::Updated {
                file_name: file_name.to_string(),
                content: content.to_string(),
                message: format!(
                    "Queued local update of {} ({}); apply on the client",
                    file_name, reason
                ),
                local: true,
            };
        }

        // Probe existence; a missing file is created empty before the
        // update is applied.
        match ctx.backend.read(file_name).await {
            Ok(_) => {}
            Err(CoreError::NotFound(_)) => {
                debug!(file = file_name, "update target missing; creating first");
                if let Err(e) = ctx.backend.create(file_name, FileKind::File, Some("")).await {
                    return ToolOutcome::failure(e);
                }
            }
            Err(e) => return ToolOutcome::failure(e),
        }

        match ctx.backend.update(file_name, content).await {
            Ok(()) => ToolOutcome::Updated {
                file_name: file_name.to_string(),
                content: content.to_string(),
                message: format!(
                    "Updated {} ({} bytes): {}\nPreview: {}",
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
