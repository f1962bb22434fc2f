//! mcp-notes-server - the notes MCP server over stdio
//!
//! Configuration comes from flags or the environment (`MCP_DEV_MODE`,
//! `MCP_DEV_PORT`, `MCP_LOG_LEVEL`, `RTM_API_KEY`, `RTM_SHARED_SECRET`).
//! A `.env` file in the working directory is loaded first.

use clap::Parser;

use create_mcp_server::config::{ServerArgs, ServerConfig};
use create_mcp_server::error::Result;
use create_mcp_server::runtime;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config: ServerConfig = ServerArgs::parse().into();
    runtime::serve(config).await
}
