//! listFiles Tool

use async_trait::async_trait;
use serde_json::Value;

use draftbench_core::ToolOutcome;

use super::local_read_unavailable;
use crate::context::ToolContext;
use crate::trait_def::Tool;

/// Lists one level of a workspace directory. Unavailable in local mode.
pub struct ListFilesTool;

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "listFiles"
    }

    fn description(&self) -> &str {
        "List the files and directories at one level of the workspace. Lists the workspace \
         root when no directory is given."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "Directory to list, relative to the workspace root. \
                                    Omit for the root."
                }
            },
            "required": []
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> ToolOutcome {
        let directory = args
            .get("directory")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        if ctx.mode.is_local() {
            return local_read_unavailable("listFiles");
        }

        match ctx.backend.list(directory.as_deref()).await {
            Ok(items) => {
                let mut files = Vec::new();
                let mut directories = Vec::new();
                for item in items {
                    if item.is_directory() {
                        directories.push(item.path);
                    } else {
                        files.push(item.path);
                    }
                }
                let scope = directory.as_deref().unwrap_or("the workspace root");
                let message = format!(
                    "Listed {}: {} file(s), {} directory(ies)",
                    scope,
                    files.len(),
                    directories.len()
                );
                ToolOutcome::Listed {
                    directory,
                    files,
                    directories,
                    message,
                }
            }
            Err(e) => ToolOutcome::failure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_tools::test_support::{local_ctx, remote_ctx};
    use draftbench_core::FileKind;

    #[tokio::test]
    async fn test_list_root_partitions_entries() {
        let (_dir, ctx) = remote_ctx();
        ctx.backend
            .create("a.txt", FileKind::File, Some("x"))
            .await
            .unwrap();
        ctx.backend
            .create("src", FileKind::Directory, None)
            .await
            .unwrap();

        let outcome = ListFilesTool.execute(&ctx, serde_json::json!({})).await;
        match &outcome {
            ToolOutcome::Listed {
                files, directories, ..
            } => {
                assert_eq!(files, &vec!["a.txt".to_string()]);
                assert_eq!(directories, &vec!["src".to_string()]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_new_file_appears_exactly_once() {
        let (_dir, ctx) = remote_ctx();
        ctx.backend
            .create("welcome.html", FileKind::File, Some("<h1>Hi</h1>"))
            .await
            .unwrap();

        let outcome = ListFilesTool.execute(&ctx, serde_json::json!({})).await;
        match outcome {
            ToolOutcome::Listed { files, .. } => {
                assert_eq!(
                    files.iter().filter(|f| *f == "welcome.html").count(),
                    1
                );
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_subdirectory() {
        let (_dir, ctx) = remote_ctx();
        ctx.backend
            .create("src/main.rs", FileKind::File, Some("fn main() {}"))
            .await
            .unwrap();

        let outcome = ListFilesTool
            .execute(&ctx, serde_json::json!({"directory": "src"}))
            .await;
        match outcome {
            ToolOutcome::Listed {
                directory, files, ..
            } => {
                assert_eq!(directory.as_deref(), Some("src"));
                assert_eq!(files, vec!["src/main.rs".to_string()]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_local_list_is_explicit_failure() {
        let (_dir, ctx) = local_ctx();
        let outcome = ListFilesTool.execute(&ctx, serde_json::json!({})).await;
        assert!(!outcome.is_success());
        assert!(outcome.error().unwrap().contains("local mode"));
    }
}
