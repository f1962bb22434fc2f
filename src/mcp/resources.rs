//! MCP Resources Support
//!
//! Notes are exposed as `note:///<id>` resources. When RTM is enabled two
//! more resources report on the upstream connection.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::rtm::{check_health, RtmClient};
use crate::service::{Note, NotesService};

/// Prefix of every note URI.
pub const NOTE_URI_SCHEME: &str = "note:///";
/// Prefix of RTM resource URIs.
pub const RTM_URI_SCHEME: &str = "rtm:///";

pub const RTM_HEALTH_URI: &str = "rtm:///health";
pub const RTM_SERVER_TIME_URI: &str = "rtm:///server/time";

const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

/// Bytes left unescaped in a note id.
const NOTE_ID: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// URI of the note with `id`.
pub fn make_note_uri(id: &str) -> String {
    format!("{}{}", NOTE_URI_SCHEME, utf8_percent_encode(id, NOTE_ID))
}

/// Note id addressed by `uri`.
///
/// Fails with [`Error::InvalidUri`] on another scheme, an empty id, an id
/// spanning more than one path segment, or an undecodable escape.
pub fn parse_note_uri(uri: &str) -> Result<String> {
    let encoded = uri.strip_prefix(NOTE_URI_SCHEME).ok_or_else(|| {
        Error::InvalidUri(format!("Invalid URI scheme. Expected {}", NOTE_URI_SCHEME))
    })?;

    if encoded.is_empty() || encoded.contains('/') {
        return Err(Error::InvalidUri(format!("Invalid note URI: {}", uri)));
    }

    percent_decode_str(encoded)
        .decode_utf8()
        .map(|id| id.into_owned())
        .map_err(|_| Error::InvalidUri(format!("Invalid note URI: {}", uri)))
}

/// A resource exposed by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl From<&Note> for Resource {
    fn from(note: &Note) -> Self {
        Self {
            uri: make_note_uri(&note.id),
            name: note.title.clone(),
            description: Some(format!(
                "A text note: {} (Created: {})",
                note.title,
                note.created_at.to_rfc3339()
            )),
            mime_type: Some(TEXT_PLAIN.to_string()),
        }
    }
}

/// Resource contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ResourceContents {
    /// Plain-text contents for `uri`.
    pub fn text(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: Some(TEXT_PLAIN.to_string()),
            text: Some(text.into()),
        }
    }
}

/// Result of resources/list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesResult {
    pub resources: Vec<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Result of resources/read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
}

/// Resource registry over the notes store and the optional RTM client.
pub struct ResourceRegistry {
    notes: Arc<NotesService>,
    rtm: Option<Arc<RtmClient>>,
}

impl ResourceRegistry {
    /// Create a registry for `notes`, adding RTM resources when `rtm` is set.
    pub fn new(notes: Arc<NotesService>, rtm: Option<Arc<RtmClient>>) -> Self {
        Self { notes, rtm }
    }

    /// All resources: notes in insertion order, then RTM resources.
    pub async fn list(&self) -> ListResourcesResult {
        debug!("Listing resources");
        let mut resources: Vec<Resource> = self.notes.list().await.iter().map(Resource::from).collect();

        if self.rtm.is_some() {
            resources.push(Resource {
                uri: RTM_HEALTH_URI.to_string(),
                name: "RTM Health Check".to_string(),
                description: Some(
                    "Health status of the Remember The Milk API connection".to_string(),
                ),
                mime_type: Some(APPLICATION_JSON.to_string()),
            });
            resources.push(Resource {
                uri: RTM_SERVER_TIME_URI.to_string(),
                name: "RTM Server Time".to_string(),
                description: Some("Current server time from Remember The Milk".to_string()),
                mime_type: Some(TEXT_PLAIN.to_string()),
            });
        }

        ListResourcesResult {
            resources,
            next_cursor: None,
        }
    }

    /// Read the resource at `uri`.
    pub async fn read(&self, uri: &str) -> Result<ReadResourceResult> {
        debug!("Reading resource: {}", uri);

        if let (Some(client), true) = (&self.rtm, uri.starts_with(RTM_URI_SCHEME)) {
            return Self::read_rtm(client, uri).await;
        }

        let id = parse_note_uri(uri)?;
        let note = self.notes.get(&id).await.inspect_err(|_| {
            error!("Note {} not found", id);
        })?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(uri, note.content)],
        })
    }

    async fn read_rtm(client: &RtmClient, uri: &str) -> Result<ReadResourceResult> {
        let contents = match uri {
            RTM_HEALTH_URI => {
                let status = check_health(client).await;
                ResourceContents {
                    uri: uri.to_string(),
                    mime_type: Some(APPLICATION_JSON.to_string()),
                    text: Some(serde_json::to_string_pretty(&status)?),
                }
            }
            RTM_SERVER_TIME_URI => {
                let time = client.server_time().await.map_err(|e| {
                    Error::Internal(format!("Failed to get RTM server time: {}", e))
                })?;
                ResourceContents::text(uri, time)
            }
            _ => return Err(Error::NotFound(format!("RTM resource not found: {}", uri))),
        };

        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }
}
