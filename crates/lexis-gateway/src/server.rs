// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use lexis_core::LexisError;
use lexis_router::MessageRouter;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::{handlers, ws};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The single router every socket is attached to.
    pub router: Arc<MessageRouter>,
    pub auth: AuthConfig,
}

/// Gateway server configuration (mirrors `GatewayConfig` from lexis-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    /// Port to bind. `0` picks a free port.
    pub port: u16,
    /// Bearer token for the WebSocket handshake (None = open).
    pub bearer_token: Option<String>,
}

impl From<&lexis_config::model::GatewayConfig> for ServerConfig {
    fn from(config: &lexis_config::model::GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            bearer_token: config.bearer_token.clone(),
        }
    }
}

/// Builds the route table:
/// - GET /health (no auth)
/// - GET /ws (auth during handshake)
pub fn app(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A bound but not yet serving gateway.
pub struct Gateway {
    listener: TcpListener,
    state: GatewayState,
}

impl Gateway {
    pub async fn bind(config: &ServerConfig, router: Arc<MessageRouter>) -> Result<Self, LexisError> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| LexisError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;
        Ok(Self {
            listener,
            state: GatewayState {
                router,
                auth: AuthConfig::new(config.bearer_token.clone()),
            },
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, LexisError> {
        self.listener
            .local_addr()
            .map_err(|e| LexisError::Internal(format!("gateway has no local address: {e}")))
    }

    /// Serves until `shutdown` is cancelled.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), LexisError> {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "gateway listening");
        }

        axum::serve(self.listener, app(self.state))
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| LexisError::Internal(format!("gateway server error: {e}")))?;

        tracing::info!("gateway stopped");
        Ok(())
    }
}
