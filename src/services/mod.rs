//! Router assembly and replica spawning for the two placeholder services.

pub mod backend;
pub mod frontend;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Binds a listener and serves the router on a background task.
///
/// Port 0 binds an ephemeral port; the bound address is returned either way.
pub async fn spawn(router: Router, host: &str, port: u16) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {}:{}", host, port))?;
    let addr = listener
        .local_addr()
        .context("listener has no local address")?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "service stopped serving");
        }
    });

    Ok((addr, handle))
}
