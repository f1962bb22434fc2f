//! Registration of generated servers with the Claude Desktop host.
//!
//! The host keeps launch descriptors under `mcpServers` in
//! `claude_desktop_config.json`. Other top-level keys are preserved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::{Error, Result};
use crate::scaffold::prompt::Prompter;

/// Host configuration file name.
pub const CONFIG_FILE_NAME: &str = "claude_desktop_config.json";

const SERVERS_KEY: &str = "mcpServers";

/// Launch descriptor stored for each server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchCommand {
    pub command: String,
    pub args: Vec<String>,
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    Replaced,
    /// An entry existed and the user declined to overwrite it.
    Skipped,
}

/// Host config location for the current platform.
pub fn host_config_path() -> Result<PathBuf> {
    host_config_path_for(std::env::consts::OS)
}

/// Host config location for `os` (as in `std::env::consts::OS`).
pub fn host_config_path_for(os: &str) -> Result<PathBuf> {
    let base = match os {
        "macos" => dirs::home_dir().map(|h| h.join("Library").join("Application Support")),
        // Roaming AppData
        "windows" => dirs::config_dir(),
        other => return Err(Error::UnsupportedPlatform(other.to_string())),
    }
    .ok_or_else(|| Error::Config("Could not determine the home directory".to_string()))?;

    Ok(base.join("Claude").join(CONFIG_FILE_NAME))
}

/// Command the host runs to start the server at `project_path`.
pub fn launch_command(project_path: &Path) -> LaunchCommand {
    LaunchCommand {
        command: "cargo".to_string(),
        args: vec![
            "run".to_string(),
            "--release".to_string(),
            "--quiet".to_string(),
            "--manifest-path".to_string(),
            project_path.join("Cargo.toml").to_string_lossy().to_string(),
        ],
    }
}

async fn read_config(config_path: &Path) -> Result<Map<String, Value>> {
    let content = match fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::Config(format!(
            "{} does not contain a JSON object",
            config_path.display()
        ))),
    }
}

/// Add or replace the entry for `name` in the host config at `config_path`.
///
/// An existing entry is only replaced after confirmation; declining leaves the
/// file untouched.
pub async fn register_server(
    config_path: &Path,
    name: &str,
    project_path: &Path,
    prompter: &mut dyn Prompter,
) -> Result<Registration> {
    let mut config = read_config(config_path).await?;

    let servers = config
        .entry(SERVERS_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    let servers = servers
        .as_object_mut()
        .ok_or_else(|| Error::Config(format!("\"{}\" is not a JSON object", SERVERS_KEY)))?;

    let outcome = if servers.contains_key(name) {
        let question = format!(
            "An MCP server named \"{}\" is already configured for Claude.app. Overwrite?",
            name
        );
        if !prompter.confirm(&question, false)? {
            info!("Kept the existing Claude.app entry for {}", name);
            return Ok(Registration::Skipped);
        }
        Registration::Replaced
    } else {
        Registration::Added
    };

    servers.insert(
        name.to_string(),
        serde_json::to_value(launch_command(project_path))?,
    );

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(&Value::Object(config))?;
    fs::write(config_path, json + "\n").await?;
    info!("Registered {} in {}", name, config_path.display());

    Ok(outcome)
}
