//! Test doubles shared by the worker's unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tether_client::Fetcher;
use tether_core::{AppConfig, CacheDb, Error, ResponseSnapshot};
use tokio::sync::Notify;
use url::Url;

use crate::context::WorkerContext;

/// Canned network: every URL either answers with a fixed snapshot or fails.
/// Unknown URLs fail like an unreachable host.
#[derive(Default)]
pub(crate) struct StubFetcher {
    routes: Mutex<HashMap<String, Option<ResponseSnapshot>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, url: &str, status: u16, body: &str) -> &Self {
        let snapshot = ResponseSnapshot::new(url, status)
            .with_header("content-type", "text/plain")
            .with_header("date", chrono::Utc::now().to_rfc2822())
            .with_body(body);
        self.routes.lock().unwrap().insert(url.to_string(), Some(snapshot));
        self
    }

    pub(crate) fn fail(&self, url: &str) -> &Self {
        self.routes.lock().unwrap().insert(url.to_string(), None);
        self
    }

    /// Hold requests for `url` until the returned gate is notified. The
    /// route is read after the gate opens, so it can still be changed.
    pub(crate) fn gate(&self, url: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(url.to_string(), gate.clone());
        gate
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn get(&self, url: &Url) -> Result<ResponseSnapshot, Error> {
        self.calls.lock().unwrap().push(url.to_string());
        let gate = self.gates.lock().unwrap().get(url.as_str()).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.routes.lock().unwrap().get(url.as_str()) {
            Some(Some(snapshot)) => Ok(snapshot.clone()),
            _ => Err(Error::Network(format!("{url}: connection refused"))),
        }
    }
}

pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        origin: "https://app.test".into(),
        cache_prefix: "app".into(),
        version: "v2".into(),
        manifest: vec!["/index.html".into(), "/app.js".into()],
        ..Default::default()
    }
}

pub(crate) async fn test_context(fetcher: Arc<StubFetcher>) -> Arc<WorkerContext> {
    let db = CacheDb::open_in_memory().await.unwrap();
    Arc::new(WorkerContext::new(test_config(), db, fetcher).unwrap())
}

/// Yield until the context reaches `state`.
pub(crate) async fn wait_for_state(ctx: &WorkerContext, state: crate::LifecycleState) {
    while ctx.state().await != state {
        tokio::task::yield_now().await;
    }
}

pub(crate) fn ok(url: &str, body: &str) -> ResponseSnapshot {
    ResponseSnapshot::new(url, 200).with_body(body)
}
