//! Note tools.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::mcp::handler::{
    get_non_empty_string_arg, require_arguments, success_result, ToolArguments, ToolHandler,
};
use crate::mcp::protocol::{Tool, ToolResult};
use crate::service::NotesService;

/// Create note tool.
pub struct CreateNoteTool {
    service: Arc<NotesService>,
}

impl CreateNoteTool {
    pub fn new(service: Arc<NotesService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ToolHandler for CreateNoteTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "create_note".to_string(),
            description: "Create a new text note".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Title of the note"
                    },
                    "content": {
                        "type": "string",
                        "description": "Text content of the note"
                    }
                },
                "required": ["title", "content"]
            }),
        }
    }

    async fn execute(&self, args: ToolArguments) -> Result<ToolResult> {
        debug!("Tool called: create_note");
        let args = require_arguments(&args)?;
        let title = get_non_empty_string_arg(args, "title", "Title")?;
        let content = get_non_empty_string_arg(args, "content", "Content")?;

        let note = self.service.create(title, content).await?;
        Ok(success_result(format!("Created note {}: {}", note.id, note.title)))
    }
}
