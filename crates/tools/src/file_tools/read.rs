//! readFile Tool

use async_trait::async_trait;
use serde_json::Value;

use draftbench_core::ToolOutcome;

use super::{local_read_unavailable, required_str};
use crate::context::ToolContext;
use crate::trait_def::Tool;

/// Reads a file's content from the remote workspace. Unavailable in local
/// mode: the orchestrator cannot see the user's real files.
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "readFile"
    }

    fn description(&self) -> &str {
        "Read the complete content of a file in the workspace."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "fileName": {
                    "type": "string",
                    "description": "Path of the file to read, relative to the workspace root"
                }
            },
            "required": ["fileName"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> ToolOutcome {
        let file_name = match required_str(&args, "readFile", "fileName") {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };

        if ctx.mode.is_local() {
            return local_read_unavailable("readFile");
        }

        match ctx.backend.read(file_name).await {
            Ok(content) => ToolOutcome::Read {
                file_name: file_name.to_string(),
                message: format!("Read {} ({} bytes)", file_name, content.len()),
                content,
            },
            Err(e) => ToolOutcome::failure(e),
        }
    }
}
