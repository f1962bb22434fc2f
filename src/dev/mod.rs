//! Development dashboard.
//!
//! A local HTTP server that mirrors the notes operations as JSON endpoints
//! and serves a single HTML page polling them. Only started in dev mode.

pub mod dashboard;

pub use dashboard::{render_dashboard, router, DashboardState};

use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;
use tracing::info;

use crate::error::{Error, Result};

/// Bind the dashboard port on localhost.
pub async fn bind_dev_server(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Config(format!("Failed to bind dashboard on {}: {}", addr, e)))
}

/// Serve the dashboard on `listener` until the task is dropped.
pub async fn run_dev_server(listener: TcpListener, state: DashboardState) -> Result<()> {
    let local = listener.local_addr()?;

    info!("Development server running at http://{}/", local);
    info!("View and manage notes at http://{}/dashboard", local);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_fails_on_taken_port() {
        let held = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = held.local_addr().unwrap().port();

        let err = bind_dev_server(port).await.unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("Failed to bind dashboard")));
    }

    #[tokio::test]
    async fn test_bind_free_port() {
        let listener = bind_dev_server(0).await.unwrap();
        let addr = listener.local_addr().unwrap();

        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }
}
