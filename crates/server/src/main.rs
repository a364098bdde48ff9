//! tether server entry point.
//!
//! Boots the worker and serves its lifecycle tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tether_client::{FetchClient, FetchConfig};
use tether_core::{AppConfig, CacheDb};
use tether_worker::{Dispatcher, TracingNotifier, WorkerContext};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod timer;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        db_path = %config.db_path.display(),
        origin = %config.origin,
        version = %config.version,
        "Starting tether server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let client = FetchClient::new(FetchConfig::from(&config))?;
    let ctx = WorkerContext::new(config, db, Arc::new(client))?;
    let dispatcher = Dispatcher::new(Arc::new(ctx), Arc::new(TracingNotifier));

    if let Some(every) = dispatcher.context().config.evict_interval() {
        tokio::spawn(timer::eviction_timer(dispatcher.clone(), every));
    }

    let server = serve_server(handler::TetherServer::new(dispatcher), stdio()).await?;
    server.waiting().await?;

    Ok(())
}
