//! HTTP transport for the MCP server

pub mod health;
pub mod mcp;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::mcp::McpServer;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub server: Arc<McpServer>,
}

/// HTTP server exposing `/mcp` and `/health`
pub struct ApiServer {
    state: Arc<ApiState>,
    addr: String,
}

impl ApiServer {
    #[must_use]
    pub fn new(server: Arc<McpServer>, addr: impl Into<String>) -> Self {
        Self {
            state: Arc::new(ApiState { server }),
            addr: addr.into(),
        }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        router(Arc::clone(&self.state))
    }

    /// Bind and serve until the process is interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or the server fails
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind {}: {e}", self.addr)))?;

        tracing::info!(addr = %self.addr, "HTTP transport listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP transport stopped");
        Ok(())
    }
}

/// All routes with tracing
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(mcp::router(state))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
