//! Project scaffolding.
//!
//! - `template` - EJS rendering
//! - `header` - provenance headers for generated files
//! - `generator` - template tree to project directory
//! - `host` - Claude Desktop registration
//! - `prompt` - stdin questions for missing arguments

pub mod generator;
pub mod header;
pub mod host;
pub mod prompt;
pub mod template;

pub use generator::{create_server, GenerationReport, TemplateSource};
pub use host::{register_server, Registration};
pub use prompt::Prompter;
pub use template::TemplateContext;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::Args;
use crate::error::Result;

/// Default description offered when none is given.
pub const DEFAULT_DESCRIPTION: &str = "A Model Context Protocol server";

/// Values a template is rendered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub name: String,
    pub description: String,
    /// TOML value of the generated project's `create-mcp-server` dependency
    pub runtime_dependency: String,
}

impl GenerationConfig {
    /// Template variables for this configuration.
    pub fn context(&self) -> TemplateContext {
        let mut context = TemplateContext::new();
        context.insert("name".to_string(), self.name.clone());
        context.insert("description".to_string(), self.description.clone());
        context.insert(
            "runtime_dependency".to_string(),
            self.runtime_dependency.clone(),
        );
        context
    }
}

/// TOML value for the runtime dependency: the release matching this
/// generator, or a path dependency on a local checkout.
pub fn runtime_dependency(runtime_path: Option<&Path>) -> Result<String> {
    match runtime_path {
        // JSON string escapes are valid TOML basic-string escapes.
        Some(path) => {
            let absolute = std::path::absolute(path)?;
            let quoted = serde_json::to_string(&absolute.to_string_lossy())?;
            Ok(format!("{{ path = {} }}", quoted))
        }
        None => Ok(format!("\"{}\"", crate::VERSION)),
    }
}

/// Fill in the generation config from arguments, asking for whatever is
/// missing. The directory name is the default project name.
pub fn resolve_config(args: &Args, prompter: &mut dyn Prompter) -> Result<GenerationConfig> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => {
            let default = args
                .directory
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "mcp-server".to_string());
            prompter.input("What is the name of your MCP server?", &default)?
        }
    };

    let description = match &args.description {
        Some(description) => description.clone(),
        None => prompter.input("What is the description of your server?", DEFAULT_DESCRIPTION)?,
    };

    Ok(GenerationConfig {
        name,
        description,
        runtime_dependency: runtime_dependency(args.runtime_path.as_deref())?,
    })
}
