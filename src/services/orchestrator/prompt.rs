//! System Prompt Builder
//!
//! Builds the system prompt that instructs the model to drive the file
//! tools directly instead of narrating intended changes.

use draftbench_core::WorkspaceMode;
use draftbench_tools::ToolRegistry;

use crate::models::FileContextEntry;

/// Build the system prompt for one conversation turn.
///
/// Enumerates the registered tools, commands immediate tool invocation on
/// any file-mutation intent, and appends the client's file context
/// verbatim. Local mode adds the constraints of the relay contract.
pub fn build_system_prompt(
    mode: WorkspaceMode,
    registry: &ToolRegistry,
    file_context: &[FileContextEntry],
) -> String {
    let tool_list = registry
        .definitions()
        .iter()
        .map(|d| {
            format!(
                "- **{}**: {}",
                d["name"].as_str().unwrap_or_default(),
                d["description"].as_str().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = format!(
        r#"You are an AI web development assistant that edits the user's project files through tools.

## Available Tools
{tool_list}

## Rules

- When the user asks you to create, change, or remove a file, invoke the matching tool IMMEDIATELY in the same turn. Never describe what you would do, never ask for confirmation, never output file content as chat text instead of a tool call.
- Always pass the COMPLETE file content to createFile and updateFile. Never send a diff, a fragment, or a placeholder like "rest unchanged".
- Use one tool call per file. Multiple files in one request mean multiple tool calls.
- File paths are relative to the project root, with forward slashes.
- After your tool calls finish you will see their results; summarize what changed in one or two sentences."#
    );

    if mode.is_local() {
        prompt.push_str(
            r#"

## Local Workspace Mode

The user's files live on their own machine. You cannot read or list them; work only from the file context below and the conversation.
- Every createFile and updateFile call MUST carry the complete file content, because the user's browser applies your call locally.
- Do not reference server storage, URLs, or uploaded copies of the files. They do not exist.
- Do not call readFile or listFiles; they are unavailable in this mode."#,
        );
    }

    if !file_context.is_empty() {
        prompt.push_str("\n\n## Current Project Files\n");
        for entry in file_context {
            prompt.push_str(&format!("\n### {}\n```\n{}\n```\n", entry.name, entry.content));
        }
    }

    prompt
}
