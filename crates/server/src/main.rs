//! mcp-offline server entry point.
//!
//! Loads configuration, opens the cache database, runs install and activate
//! for the configured version, then serves MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use offline_client::{CacheController, ControllerConfig, FetchClient, FetchConfig};
use offline_core::{AppConfig, CacheStorage};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    tracing::info!(origin = %config.origin, version = %config.version, db = %config.db_path.display(), "starting mcp-offline");

    let storage = CacheStorage::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
    let network = FetchClient::new(FetchConfig::from_app(&config)?)?;
    let controller = Arc::new(CacheController::new(ControllerConfig::from_app(&config)?, storage, network));

    boot(&controller).await;

    let handler = handler::OfflineServer::new(controller.clone());
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    controller.settle().await;

    Ok(())
}

/// Install and activate the configured version.
///
/// Failures are logged; caches from the previous version stay in place and
/// the tools remain available to retry.
async fn boot(controller: &CacheController<FetchClient>) {
    match controller.install().await {
        Ok(outcome) => tracing::info!(cache = %outcome.cache, entries = outcome.entries.len(), "precache complete"),
        Err(e) if e.is_storage() => {
            tracing::error!(error = %e, "cache storage unavailable, install aborted");
            return;
        }
        Err(e) => {
            tracing::warn!(error = %e, "install failed, serving with previous caches");
            return;
        }
    }

    match controller.activate().await {
        Ok(outcome) => {
            tracing::info!(deleted = outcome.deleted.len(), failed = outcome.failed.len(), "activation complete")
        }
        Err(e) if e.is_storage() => tracing::error!(error = %e, "cache storage unavailable, activation aborted"),
        Err(e) => tracing::warn!(error = %e, "activation failed"),
    }
}
