//! Process-wide worker context.
//!
//! One `WorkerContext` is created at startup and shared (behind an `Arc`)
//! by every entry point. It owns the cache handle, the network seam, the
//! parsed configuration and the lifecycle state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tether_client::{Fetcher, resolve};
use tether_core::{AppConfig, CacheDb, Error};
use tokio::sync::RwLock;
use url::Url;

/// Where the worker is in its install/activate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Started, nothing preloaded yet.
    Parsed,
    /// Manifest preload in progress.
    Installing,
    /// Static partition populated; not yet controlling requests.
    Installed,
    /// Old generations being removed.
    Activating,
    /// Old generations removed; every in-scope request is intercepted.
    Activated,
}

pub struct WorkerContext {
    pub config: AppConfig,
    pub db: CacheDb,
    pub fetcher: Arc<dyn Fetcher>,
    origin: Url,
    static_partition: String,
    dynamic_partition: String,
    state: RwLock<LifecycleState>,
}

impl WorkerContext {
    /// Build a context from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the configured origin does not parse.
    pub fn new(config: AppConfig, db: CacheDb, fetcher: Arc<dyn Fetcher>) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;

        Ok(Self {
            static_partition: config.static_partition(),
            dynamic_partition: config.dynamic_partition(),
            origin,
            config,
            db,
            fetcher,
            state: RwLock::new(LifecycleState::Parsed),
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn static_partition(&self) -> &str {
        &self.static_partition
    }

    pub fn dynamic_partition(&self) -> &str {
        &self.dynamic_partition
    }

    /// Partitions consulted by cache lookups, in lookup order.
    ///
    /// The static partition comes first so the preloaded app shell always
    /// wins over a runtime copy of the same URL. Partitions of other
    /// generations are never part of the order.
    pub fn lookup_order(&self) -> [String; 2] {
        [self.static_partition.clone(), self.dynamic_partition.clone()]
    }

    /// Resolve an application path (e.g. `/index.html`) against the origin.
    pub fn resolve(&self, path: &str) -> Result<Url, Error> {
        resolve(&self.origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Move to `to` if the current state is one of `from`.
    ///
    /// The check and the write happen under one lock. Returns the replaced
    /// state, or `Err` with the current state when it is not in `from`.
    pub(crate) async fn transition(
        &self, from: &[LifecycleState], to: LifecycleState,
    ) -> Result<LifecycleState, LifecycleState> {
        let mut current = self.state.write().await;
        let previous = *current;
        if !from.contains(&previous) {
            return Err(previous);
        }
        if previous != to {
            tracing::info!(from = ?previous, to = ?to, "lifecycle transition");
            *current = to;
        }
        Ok(previous)
    }
}
