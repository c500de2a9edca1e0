// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lexis serve`: wires storage, the upstream and the router behind the
//! gateway and runs until a shutdown signal.

use std::sync::Arc;

use lexis_anthropic::AnthropicUpstream;
use lexis_config::LexisConfig;
use lexis_core::{LexisError, PersistenceAdapter, PluginAdapter, UpstreamAdapter};
use lexis_gateway::{Gateway, ServerConfig};
use lexis_router::{MessageRouter, RouterSettings};
use lexis_storage::SqliteStorage;
use tracing::{error, info};

use crate::shutdown;

pub async fn run_serve(config: LexisConfig) -> Result<(), LexisError> {
    init_tracing(&config.server.log_level);
    info!(name = %config.server.name, "starting lexis serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let upstream = Arc::new(AnthropicUpstream::new(&config.anthropic)?);

    let router = MessageRouter::new(
        Arc::clone(&storage) as Arc<dyn PersistenceAdapter>,
        Arc::clone(&upstream) as Arc<dyn UpstreamAdapter>,
        RouterSettings::from(&config),
    );

    let shutdown = shutdown::install_signal_handler();
    let gateway = Gateway::bind(&ServerConfig::from(&config.gateway), Arc::clone(&router)).await?;
    let served = gateway.serve(shutdown.clone()).await;

    // Stop streams before closing storage so no handler writes into a closed
    // connection.
    router.shutdown().await;
    for adapter in [
        Arc::clone(&upstream) as Arc<dyn PluginAdapter>,
        Arc::clone(&storage) as Arc<dyn PluginAdapter>,
    ] {
        if let Err(e) = adapter.shutdown().await {
            error!(adapter = adapter.name(), error = %e, "adapter shutdown failed");
        }
    }

    info!("lexis stopped");
    served
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lexis={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
