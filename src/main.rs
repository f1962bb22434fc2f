//! create-mcp-server - scaffold a new MCP server project
//!
//! Renders the bundled template into a new directory, then optionally
//! registers the result with the Claude Desktop host.

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};

use create_mcp_server::config::{Args, RegisterChoice};
use create_mcp_server::error::{Error, Result};
use create_mcp_server::logging;
use create_mcp_server::scaffold::host::host_config_path;
use create_mcp_server::scaffold::prompt::stdin_prompter;
use create_mcp_server::scaffold::{
    create_server, register_server, resolve_config, Prompter, Registration,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init_cli(args.verbose) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    // Checked before prompting so nothing is asked for a doomed run.
    if tokio::fs::try_exists(&args.directory).await? {
        return Err(Error::DirectoryExists(args.directory.clone()));
    }

    let mut prompter = stdin_prompter();
    let config = resolve_config(&args, &mut prompter)?;

    let template = args.template_source();
    info!("Using {}", template);
    let report = create_server(&args.directory, &config, template).await?;
    info!(
        "Created {} with {} files",
        report.root.display(),
        report.files.len()
    );

    let register = match args.register_choice() {
        RegisterChoice::Always => true,
        RegisterChoice::Never => false,
        RegisterChoice::Ask => prompter.confirm(
            "Would you like this server to be automatically installed into Claude.app?",
            true,
        )?,
    };
    if register {
        match install(&config.name, &report.root, &mut prompter).await {
            Ok(Registration::Added) => info!("Added {} to Claude.app", config.name),
            Ok(Registration::Replaced) => info!("Updated {} in Claude.app", config.name),
            Ok(Registration::Skipped) => {}
            Err(e) => warn!("Unable to install server for Claude.app: {}", e),
        }
    }

    println!("{} MCP server created successfully!", config.name);
    println!();
    println!("Next steps:");
    println!("  cd {}", args.directory.display());
    println!("  cargo build");
    println!("  cargo run");

    Ok(())
}

async fn install(name: &str, root: &Path, prompter: &mut dyn Prompter) -> Result<Registration> {
    let config_path = host_config_path()?;
    let project_path = tokio::fs::canonicalize(root).await?;
    register_server(&config_path, name, &project_path, prompter).await
}
