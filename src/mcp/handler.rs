//! Tool handler trait and registry.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::mcp::protocol::{ContentBlock, Tool, ToolResult};

/// Tool arguments as sent by the client. `None` when the object was omitted.
pub type ToolArguments = Option<HashMap<String, Value>>;

/// Handler for MCP tool calls.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> Tool;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: ToolArguments) -> Result<ToolResult>;
}

/// Registry of tool handlers.
pub struct McpHandler {
    tools: HashMap<String, Arc<dyn ToolHandler>>,
}

impl McpHandler {
    /// Create a new handler registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool handler.
    pub fn register<T: ToolHandler + 'static>(&mut self, handler: T) {
        let tool = handler.definition();
        self.tools.insert(tool.name.clone(), Arc::new(handler));
    }

    /// All registered tools, sorted by name.
    pub fn list_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.tools.values().map(|h| h.definition()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Get a tool by name.
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).cloned()
    }

    /// Run the tool `name`. Unknown names fail with [`Error::UnknownTool`].
    pub async fn call(&self, name: &str, arguments: ToolArguments) -> Result<ToolResult> {
        let handler = self
            .get_tool(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        handler.execute(arguments).await
    }

    /// Check if a tool exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl Default for McpHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to create a text content block.
pub fn text_content(text: impl Into<String>) -> ContentBlock {
    ContentBlock::Text { text: text.into() }
}

/// Helper to create a successful tool result.
pub fn success_result(text: impl Into<String>) -> ToolResult {
    ToolResult {
        content: vec![text_content(text)],
        is_error: false,
    }
}

/// Helper to unwrap the arguments object, failing when it was omitted.
pub fn require_arguments(args: &ToolArguments) -> Result<&HashMap<String, Value>> {
    args.as_ref()
        .ok_or_else(|| Error::MissingArgument("Missing required arguments".to_string()))
}

/// Helper to extract a string argument that must not be blank.
///
/// `label` names the field in the error message.
pub fn get_non_empty_string_arg<'a>(
    args: &'a HashMap<String, Value>,
    name: &str,
    label: &str,
) -> Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "{} is required and must be a non-empty string",
                label
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct TestTool {
        name: String,
    }

    #[async_trait]
    impl ToolHandler for TestTool {
        fn definition(&self) -> Tool {
            Tool {
                name: self.name.clone(),
                description: format!("Test tool: {}", self.name),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "input": { "type": "string" }
                    }
                }),
            }
        }

        async fn execute(&self, args: ToolArguments) -> Result<ToolResult> {
            let args = require_arguments(&args)?;
            let input = get_non_empty_string_arg(args, "input", "Input")?;
            Ok(success_result(format!("Executed {} with: {}", self.name, input)))
        }
    }

    fn args(value: Value) -> ToolArguments {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_handler_registration() {
        let mut handler = McpHandler::new();
        handler.register(TestTool {
            name: "test_tool".to_string(),
        });

        assert_eq!(handler.tool_count(), 1);
        assert!(handler.has_tool("test_tool"));
        assert!(!handler.has_tool("nonexistent"));
    }

    #[test]
    fn test_list_tools_sorted() {
        let mut handler = McpHandler::new();
        for name in ["tool_b", "tool_c", "tool_a"] {
            handler.register(TestTool {
                name: name.to_string(),
            });
        }

        let names: Vec<_> = handler.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["tool_a", "tool_b", "tool_c"]);
    }

    #[tokio::test]
    async fn test_call() {
        let mut handler = McpHandler::new();
        handler.register(TestTool {
            name: "echo".to_string(),
        });

        let result = handler.call("echo", args(json!({"input": "hello"}))).await.unwrap();
        assert!(!result.is_error);
        assert_eq!(result.content[0], text_content("Executed echo with: hello"));
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let handler = McpHandler::new();
        let err = handler.call("missing", None).await.unwrap_err();

        assert!(matches!(err, Error::UnknownTool(_)));
        assert_eq!(err.to_string(), "Unknown tool: missing");
    }

    #[test]
    fn test_require_arguments() {
        let err = require_arguments(&None).unwrap_err();
        assert!(matches!(err, Error::MissingArgument(_)));
        assert_eq!(err.to_string(), "Missing required arguments");

        assert!(require_arguments(&Some(HashMap::new())).unwrap().is_empty());
    }

    #[test]
    fn test_get_non_empty_string_arg() {
        let mut args = HashMap::new();
        args.insert("title".to_string(), json!("value"));
        args.insert("blank".to_string(), json!("  "));
        args.insert("number".to_string(), json!(3));

        assert_eq!(get_non_empty_string_arg(&args, "title", "Title").unwrap(), "value");

        for name in ["blank", "number", "missing"] {
            let err = get_non_empty_string_arg(&args, name, "Title").unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)));
            assert_eq!(err.to_string(), "Title is required and must be a non-empty string");
        }
    }

    #[test]
    fn test_success_result() {
        let result = success_result("Success!");
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 1);
    }
}
