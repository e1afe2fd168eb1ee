//! Serve command - run the HTTP API

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use prreview_api::AppState;
use prreview_core::{Config, MemoryStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::open_store;

/// Run the HTTP server
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides config and env)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config and env)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Keep all state in memory instead of SQLite
    #[arg(long)]
    pub in_memory: bool,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let state = if self.in_memory {
            warn!("using in-memory storage, state is lost on exit");
            AppState::from_store(Arc::new(MemoryStore::new()))
        } else {
            AppState::from_store(open_store(config).await?)
        };

        let app = prreview_api::router(state, config.server.request_timeout);

        let addr = config.server.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        prreview_api::serve(listener, app, shutdown_signal()).await?;
        Ok(())
    }
}

/// Resolve on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
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
                warn!(error = %e, "failed to listen for SIGTERM");
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

    info!("shutdown signal received");
}
