//! Tool Trait and Registry
//!
//! The unified `Tool` interface and the insertion-ordered `ToolRegistry`
//! used for dynamic lookup and dispatch. A tool's `execute` is infallible
//! by signature: every internal error is converted into a
//! `ToolOutcome::Failure`, because an exception escaping a tool call
//! corrupts the model's tool-calling protocol state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use draftbench_core::ToolOutcome;

use crate::context::ToolContext;

/// Unified tool interface.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of this tool (e.g., "createFile", "listFiles")
    fn name(&self) -> &str;

    /// Natural-language description shown to the model
    fn description(&self) -> &str;

    /// JSON schema (draft-07) describing the tool's input parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool. Never errors past this boundary; failures are
    /// structured outcomes the model can react to.
    async fn execute(&self, ctx: &ToolContext, args: Value) -> ToolOutcome;
}

/// Registry of available tools.
///
/// Provides O(1) lookup by name and deterministic, insertion-ordered
/// iteration for prompt and provider definition generation.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Insertion order for deterministic iteration
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// All tool names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions in registration order, suitable for sending to
    /// LLM providers and for system prompt generation.
    pub fn definitions(&self) -> Vec<Value> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "input_schema": tool.parameters_schema(),
                })
            })
            .collect()
    }

    /// Execute a tool by name. An unknown tool is a failure outcome, not
    /// an error: the model reacts to it like any other tool failure.
    pub async fn execute(&self, name: &str, ctx: &ToolContext, args: Value) -> ToolOutcome {
        match self.tools.get(name) {
            Some(tool) => tool.execute(ctx, args).await,
            None => ToolOutcome::failure(format!("Unknown tool: {}", name)),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use draftbench_core::WorkspaceMode;
    use draftbench_storage::{DiskBackend, StorageBackend};

    struct MockTool {
        tool_name: String,
    }

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &str {
            &self.tool_name
        }

        fn description(&self) -> &str {
            "A mock tool"
        }

        fn parameters_schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _ctx: &ToolContext, _args: Value) -> ToolOutcome {
            ToolOutcome::Read {
                file_name: "mock".into(),
                content: format!("{} executed", self.tool_name),
                message: "ok".into(),
            }
        }
    }

    fn make_ctx() -> ToolContext {
        let backend: Arc<dyn StorageBackend> = Arc::new(DiskBackend::new("/tmp/ws"));
        ToolContext::new("sess", "tc-1", WorkspaceMode::Remote, backend)
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.definitions().is_empty());
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool {
            tool_name: "readFile".into(),
        }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("readFile").unwrap().name(), "readFile");
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_names_preserve_insertion_order() {
        let mut registry = ToolRegistry::new();
        for name in ["createFile", "updateFile", "readFile"] {
            registry.register(Arc::new(MockTool {
                tool_name: name.into(),
            }));
        }
        assert_eq!(registry.names(), vec!["createFile", "updateFile", "readFile"]);
    }

    #[test]
    fn test_definitions_match_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool {
            tool_name: "listFiles".into(),
        }));
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0]["name"], "listFiles");
        assert!(defs[0]["input_schema"].is_object());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool_is_failure_outcome() {
        let registry = ToolRegistry::new();
        let outcome = registry.execute("missing", &make_ctx(), Value::Null).await;
        assert!(!outcome.is_success());
        assert!(outcome.error().unwrap().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_execute_known_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool {
            tool_name: "readFile".into(),
        }));
        let outcome = registry.execute("readFile", &make_ctx(), Value::Null).await;
        assert!(outcome.is_success());
    }
}
