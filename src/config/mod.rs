//! Configuration for the generator CLI and the notes server.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

use crate::scaffold::generator::TemplateSource;
use crate::DEFAULT_DEV_PORT;

/// Command-line arguments for the project generator.
#[derive(Parser, Debug, Clone)]
#[command(name = "create-mcp-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create a new MCP server project from a template")]
pub struct Args {
    /// Directory to create the project in
    pub directory: PathBuf,

    /// Name of the server (defaults to the directory name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Description of the server
    #[arg(short, long)]
    pub description: Option<String>,

    /// Template directory to render instead of the bundled one
    #[arg(long, env = "CREATE_MCP_SERVER_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Local create-mcp-server checkout for the generated project to depend
    /// on instead of the registry release
    #[arg(long, env = "CREATE_MCP_SERVER_RUNTIME_PATH")]
    pub runtime_path: Option<PathBuf>,

    /// Register the server with Claude Desktop without asking
    #[arg(long, conflicts_with = "no_register")]
    pub register: bool,

    /// Never register the server with Claude Desktop
    #[arg(long)]
    pub no_register: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Whether to register the generated server with the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterChoice {
    Ask,
    Always,
    Never,
}

impl Args {
    pub fn register_choice(&self) -> RegisterChoice {
        if self.register {
            RegisterChoice::Always
        } else if self.no_register {
            RegisterChoice::Never
        } else {
            RegisterChoice::Ask
        }
    }

    /// Template to render: `--template` if given, else the one compiled in.
    pub fn template_source(&self) -> TemplateSource {
        match &self.template {
            Some(dir) => TemplateSource::Dir(dir.clone()),
            None => TemplateSource::Bundled,
        }
    }
}

/// Minimum log level for the notes server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Arguments for the notes server. MCP hosts usually launch servers without
/// flags, so every option can also come from the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "mcp-notes-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server exposing an in-memory notes store")]
pub struct ServerArgs {
    /// Server name reported to clients
    #[arg(long, default_value = "mcp-notes-server", env = "MCP_SERVER_NAME")]
    pub name: String,

    /// Start the development dashboard
    #[arg(long, env = "MCP_DEV_MODE")]
    pub dev_mode: bool,

    /// Development dashboard port
    #[arg(long, default_value = "3333", env = "MCP_DEV_PORT")]
    pub dev_port: u16,

    /// Minimum log level
    #[arg(long, value_enum, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Remember The Milk API key
    #[arg(long, env = "RTM_API_KEY", hide_env_values = true)]
    pub rtm_api_key: Option<String>,

    /// Remember The Milk shared secret
    #[arg(long, env = "RTM_SHARED_SECRET", hide_env_values = true)]
    pub rtm_shared_secret: Option<String>,
}

/// Remember The Milk credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtmCredentials {
    pub api_key: String,
    pub shared_secret: String,
}

/// Notes server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
    /// Development dashboard enabled
    pub dev_mode: bool,
    /// Development dashboard port
    pub dev_port: u16,
    /// Minimum log level
    pub log_level: LogLevel,
    /// RTM credentials, when both key and secret are configured
    #[serde(default, skip_serializing)]
    pub rtm: Option<RtmCredentials>,
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        let rtm = match (args.rtm_api_key, args.rtm_shared_secret) {
            (Some(api_key), Some(shared_secret))
                if !api_key.is_empty() && !shared_secret.is_empty() =>
            {
                Some(RtmCredentials {
                    api_key,
                    shared_secret,
                })
            }
            _ => None,
        };

        Self {
            name: args.name,
            version: crate::VERSION.to_string(),
            dev_mode: args.dev_mode,
            dev_port: args.dev_port,
            log_level: args.log_level,
            rtm,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "mcp-notes-server".to_string(),
            version: crate::VERSION.to_string(),
            dev_mode: false,
            dev_port: DEFAULT_DEV_PORT,
            log_level: LogLevel::Info,
            rtm: None,
        }
    }
}
