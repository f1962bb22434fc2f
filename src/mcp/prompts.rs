//! MCP Prompt Templates
//!
//! `summarize_notes` embeds every note as a resource and asks for a summary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::mcp::protocol::ContentBlock;
use crate::mcp::resources::{make_note_uri, ResourceContents};
use crate::service::NotesService;

pub const SUMMARIZE_NOTES: &str = "summarize_notes";

const EMPTY_NOTES_TEXT: &str =
    "There are no notes to summarize. Please create some notes first using the create_note tool.";
const SUMMARY_INTRO: &str = "Please summarize the following notes:";
const SUMMARY_INSTRUCTION: &str = "Provide a concise summary of all the notes above.";

/// A prompt argument definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// A prompt template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<PromptArgument>,
}

/// A prompt message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: ContentBlock,
}

impl PromptMessage {
    /// User message carrying `content`.
    pub fn user(content: ContentBlock) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }

    /// User message carrying plain text.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(ContentBlock::Text { text: text.into() })
    }
}

/// Result of prompts/list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPromptsResult {
    pub prompts: Vec<Prompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Result of prompts/get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPromptResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

/// Prompt registry.
pub struct PromptRegistry {
    notes: Arc<NotesService>,
}

impl PromptRegistry {
    /// Create a registry whose prompts read from `notes`.
    pub fn new(notes: Arc<NotesService>) -> Self {
        Self { notes }
    }

    /// All prompts.
    pub fn list(&self) -> Vec<Prompt> {
        vec![Prompt {
            name: SUMMARIZE_NOTES.to_string(),
            description: "Summarize all notes in the system".to_string(),
            arguments: Vec::new(),
        }]
    }

    /// Render the prompt `name`.
    pub async fn get(
        &self,
        name: &str,
        _arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult> {
        debug!("Prompt requested: {}", name);
        match name {
            SUMMARIZE_NOTES => Ok(self.summarize_notes().await),
            _ => Err(Error::NotFound(format!("Prompt not found: {}", name))),
        }
    }

    async fn summarize_notes(&self) -> GetPromptResult {
        let notes = self.notes.list().await;

        if notes.is_empty() {
            debug!("No notes found to summarize");
            return GetPromptResult {
                description: None,
                messages: vec![PromptMessage::user_text(EMPTY_NOTES_TEXT)],
            };
        }

        debug!("Returning prompt with {} notes", notes.len());
        let mut messages = Vec::with_capacity(notes.len() + 2);
        messages.push(PromptMessage::user_text(SUMMARY_INTRO));
        messages.extend(notes.into_iter().map(|note| {
            PromptMessage::user(ContentBlock::Resource {
                resource: ResourceContents::text(make_note_uri(&note.id), note.content),
            })
        }));
        messages.push(PromptMessage::user_text(SUMMARY_INSTRUCTION));

        GetPromptResult {
            description: Some("Summarize the current notes".to_string()),
            messages,
        }
    }
}
