//! sw-host entry point.
//!
//! Boots the worker registration and serves it as an MCP server on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{FetchConfig, HttpNetwork};
use swcache_core::{AppConfig, CacheDb, CacheStore, Clients, MemoryStore, Registration, WorkerEnv};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;
mod updates;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let origin = config.origin_url()?;
    let deployment = config.deployment()?;

    let store: Arc<dyn CacheStore> = match &config.db_path {
        Some(path) => Arc::new(CacheDb::open(path).await?),
        None => Arc::new(MemoryStore::new()),
    };
    let network = HttpNetwork::new(&FetchConfig {
        user_agent: config.user_agent.clone(),
        timeout: config.timeout(),
        ..Default::default()
    })?;

    let env = WorkerEnv { store, network: Arc::new(network), clients: Clients::new() };
    let registration = Arc::new(Registration::new(env));

    // the page that registers the worker is open before activation claims it
    updates::spawn_page_listener(registration.clients().connect().await);

    match registration.register(deployment).await {
        Ok(outcome) => tracing::info!(?outcome, "service worker registered"),
        Err(e) => tracing::warn!(error = %e, "service worker registration failed"),
    }
    updates::spawn_update_checks(registration.clone(), config.update_interval());

    tracing::info!(origin = %origin, version = %config.cache_version, "Starting sw-host on stdio transport");

    let handler = handler::SwHostServer::new(registration, origin);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
