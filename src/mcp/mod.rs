//! Model Context Protocol (MCP) implementation.
//!
//! JSON-RPC message handling, the line transport, and the registries the
//! notes server exposes.
//!
//! # Architecture
//!
//! - `protocol` - Core MCP types and message definitions
//! - `server` - Request dispatch
//! - `transport` - Line-delimited JSON over stdio
//! - `handler` - Tool trait and registry
//! - `resources` - Note and RTM resources
//! - `prompts` - Prompt templates

pub mod handler;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod transport;

pub use handler::McpHandler;
pub use prompts::PromptRegistry;
pub use protocol::*;
pub use resources::ResourceRegistry;
pub use server::McpServer;
pub use transport::{LineTransport, StdioTransport, Transport};
