//! MCP tool implementations.
//!
//! - `notes` - note creation
//! - `rtm` - Remember The Milk health check (only with RTM enabled)

pub mod notes;
pub mod rtm;

use std::sync::Arc;

use crate::mcp::handler::McpHandler;
use crate::rtm::RtmClient;
use crate::service::NotesService;

/// Register all tools with the handler.
pub fn register_all_tools(
    handler: &mut McpHandler,
    notes_service: Arc<NotesService>,
    rtm_client: Option<Arc<RtmClient>>,
) {
    handler.register(notes::CreateNoteTool::new(notes_service));

    if let Some(client) = rtm_client {
        handler.register(rtm::RtmHealthCheckTool::new(client));
    }
}
