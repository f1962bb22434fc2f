//! create-mcp-server - MCP project scaffolding and notes server runtime
//!
//! Two halves live in this crate:
//!
//! 1. **Scaffold** (`scaffold`) - renders a template tree into a new project
//!    directory and optionally registers it with the Claude Desktop host.
//! 2. **Runtime** (`runtime`) - the notes server that generated projects run:
//!    an in-memory store (`service`), MCP handlers (`mcp`, `tools`), a dev
//!    dashboard (`dev`) and an optional Remember The Milk integration (`rtm`).
//!
//! # Layers
//!
//! - **Service Layer** (`service`) - the notes store
//! - **MCP Layer** (`mcp`) - JSON-RPC protocol, stdio transport, resources, prompts
//! - **Tools Layer** (`tools`) - `create_note` and `rtm_health_check`
//! - **Dev Layer** (`dev`) - axum dashboard over the same store

pub mod config;
pub mod dev;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod rtm;
pub mod runtime;
pub mod scaffold;
pub mod service;
pub mod tools;

pub use error::{Error, Result};

/// Crate version, reported as the server version of generated projects.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port of the development dashboard.
pub const DEFAULT_DEV_PORT: u16 = 3333;
