//! File Tools
//!
//! The five mediated file operations. Every tool follows the same
//! dispatch shape: in local mode, return a relayed instruction without
//! touching any backend; in remote mode, validate and execute against the
//! storage backend, converting every error into a `Failure` outcome.

mod create;
mod delete;
mod list;
mod read;
mod update;

pub use create::CreateFileTool;
pub use delete::DeleteFileTool;
pub use list::ListFilesTool;
pub use read::ReadFileTool;
pub use update::UpdateFileTool;

use std::sync::Arc;

use serde_json::Value;

use draftbench_core::ToolOutcome;

use crate::trait_def::ToolRegistry;

/// Registry with the five file tools in their canonical order.
pub fn default_file_tools() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(CreateFileTool));
    registry.register(Arc::new(UpdateFileTool));
    registry.register(Arc::new(ReadFileTool));
    registry.register(Arc::new(ListFilesTool));
    registry.register(Arc::new(DeleteFileTool));
    registry
}

/// Extract a required string argument, or produce a failure outcome that
/// teaches the model the correct call format for the retry.
pub(crate) fn required_str<'a>(
    args: &'a Value,
    tool: &str,
    param: &str,
) -> Result<&'a str, ToolOutcome> {
    match args.get(param).and_then(|v| v.as_str()) {
        Some(s) => Ok(s),
        None => Err(ToolOutcome::failure(format!(
            "Missing required parameter '{}' for {}. Provide it as a string field in the tool input.",
            param, tool
        ))),
    }
}

/// Short content preview for human-readable messages. The full content
/// still travels in the outcome's `content` field.
pub(crate) fn preview(content: &str) -> String {
    const MAX: usize = 120;
    if content.chars().count() <= MAX {
        return content.to_string();
    }
    let truncated: String = content.chars().take(MAX).collect();
    format!("{}…", truncated)
}

/// The uniform local-mode refusal for read-style tools: the orchestrator
/// process cannot see the user's real files, so there is nothing to read
/// or list — file contents must arrive as client-supplied context.
pub(crate) fn local_read_unavailable(tool: &str) -> ToolOutcome {
    ToolOutcome::failure(format!(
        "{} is not available in local mode: the assistant cannot access the user's local \
         workspace. File contents must be provided as conversation context by the client.",
        tool
    ))
}
