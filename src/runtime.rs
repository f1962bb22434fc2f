//! Notes server runtime.
//!
//! Generated projects call [`serve`] from their `main`; the bundled
//! `mcp-notes-server` binary does the same.

use std::sync::Arc;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::dev::{bind_dev_server, run_dev_server, DashboardState};
use crate::error::{Error, Result};
use crate::logging::{self, LogBuffer};
use crate::mcp::{McpHandler, McpServer, PromptRegistry, ResourceRegistry, StdioTransport};
use crate::rtm::RtmClient;
use crate::service::NotesService;
use crate::tools;

/// Services shared by the MCP server and the dashboard.
#[derive(Clone)]
pub struct Services {
    pub notes: Arc<NotesService>,
    pub logs: LogBuffer,
    pub rtm: Option<Arc<RtmClient>>,
}

impl Services {
    /// Construct every service for `config`, starting from the seed notes.
    pub fn new(config: &ServerConfig, logs: LogBuffer) -> Result<Self> {
        let rtm = config
            .rtm
            .as_ref()
            .map(RtmClient::from_credentials)
            .transpose()?
            .map(Arc::new);

        Ok(Self {
            notes: Arc::new(NotesService::with_seed_notes()),
            logs,
            rtm,
        })
    }
}

/// Build the MCP server over `services`.
pub fn build_server(config: &ServerConfig, services: &Services) -> McpServer {
    let mut handler = McpHandler::new();
    tools::register_all_tools(&mut handler, services.notes.clone(), services.rtm.clone());
    info!("Registered {} MCP tools", handler.tool_count());

    McpServer::new(
        handler,
        PromptRegistry::new(services.notes.clone()),
        ResourceRegistry::new(services.notes.clone(), services.rtm.clone()),
        config.name.clone(),
    )
}

/// Log panics through tracing and exit with status 1.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        error!("Uncaught panic: {}", panic_info);
        default_hook(panic_info);
        std::process::exit(1);
    }));
}

/// Resolves on ctrl-c, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Run the notes server on stdio until the client disconnects or a shutdown
/// signal arrives. In dev mode the dashboard runs alongside and keeps the
/// process alive after the client disconnects.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let logs = LogBuffer::new();
    logging::init(config.log_level, &logs)?;
    install_panic_hook();

    info!("{} v{}", config.name, config.version);
    let services = Services::new(&config, logs)?;
    if services.rtm.is_some() {
        info!("RTM integration enabled");
    }
    let server = build_server(&config, &services);

    // Bind errors fail startup.
    let mut dashboard = if config.dev_mode {
        let state = DashboardState::new(
            &config.name,
            services.notes.clone(),
            services.logs.clone(),
            services.rtm.clone(),
        )?;
        let listener = bind_dev_server(config.dev_port).await?;
        Some(tokio::spawn(run_dev_server(listener, state)))
    } else {
        None
    };

    tokio::select! {
        result = server.run(StdioTransport::stdio()) => {
            result?;
            if let Some(task) = dashboard.as_mut() {
                info!("Client disconnected; dashboard still running");
                tokio::select! {
                    finished = task => {
                        finished
                            .map_err(|e| Error::Internal(format!("Dev server task failed: {}", e)))??;
                        info!("Dev server stopped");
                    }
                    _ = shutdown_signal() => {}
                }
            }
        }
        _ = shutdown_signal() => {}
    }

    info!("Shutting down");
    if let Some(task) = dashboard {
        task.abort();
    }
    Ok(())
}
