//! Request routing and caching strategies.
//!
//! ### Strategies
//! - **network-first** for API paths: the network answer wins; the cache is
//!   only consulted when the network cannot be reached.
//! - **cache-first** for everything else: a cached copy is returned without
//!   revalidation; misses go to the network and 2xx answers are stored.
//!
//! ### Cache writes
//! Writes after a network success are spawned and never awaited on the
//! response path. Storage failures there are logged and swallowed. The
//! handle is returned so a host can keep the worker alive until the write
//! lands.

use serde::{Deserialize, Serialize};
use tether_core::{CacheDb, Error, ResponseSnapshot};
use tokio::task::JoinHandle;
use url::Url;

use crate::context::WorkerContext;
use crate::request::{InterceptedRequest, RequestClass};

/// Where a routed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    /// The entry-point document served in place of an unreachable page.
    OfflineFallback,
}

/// A response produced by the worker.
#[derive(Debug)]
pub struct Routed {
    pub response: ResponseSnapshot,
    pub source: ResponseSource,
    /// Pending write into the dynamic partition, if one was started.
    pub cache_write: Option<JoinHandle<()>>,
}

impl Routed {
    fn new(response: ResponseSnapshot, source: ResponseSource) -> Self {
        Self { response, source, cache_write: None }
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// The worker did not intercept; the host sends the request itself.
    Passthrough,
    Respond(Routed),
}

/// Route one intercepted request.
///
/// # Errors
///
/// Returns `Error::Offline` when neither network nor cache can answer.
pub async fn route(ctx: &WorkerContext, request: &InterceptedRequest) -> Result<FetchOutcome, Error> {
    let routed = match RequestClass::of(ctx, request) {
        RequestClass::Passthrough => return Ok(FetchOutcome::Passthrough),
        RequestClass::Api => network_first(ctx, request).await?,
        RequestClass::Asset => cache_first(ctx, request).await?,
    };

    Ok(FetchOutcome::Respond(routed))
}

async fn network_first(ctx: &WorkerContext, request: &InterceptedRequest) -> Result<Routed, Error> {
    let url = request.url();

    match ctx.fetcher.get(url).await {
        Ok(response) => Ok(from_network(ctx, response)),
        Err(e) if e.is_network_failure() => {
            tracing::debug!(url = %url, error = %e, "network failed, falling back to cache");
            cached(ctx, url)
                .await
                .map(|hit| Routed::new(hit, ResponseSource::Cache))
                .ok_or_else(|| Error::Offline(url.to_string()))
        }
        Err(e) => Err(e),
    }
}

async fn cache_first(ctx: &WorkerContext, request: &InterceptedRequest) -> Result<Routed, Error> {
    let url = request.url();

    if let Some(hit) = cached(ctx, url).await {
        tracing::debug!(url = %url, "cache hit");
        return Ok(Routed::new(hit, ResponseSource::Cache));
    }

    tracing::debug!(url = %url, "cache miss");

    match ctx.fetcher.get(url).await {
        Ok(response) => Ok(from_network(ctx, response)),
        Err(e) if e.is_network_failure() => {
            if !request.is_navigation() {
                return Err(Error::Offline(url.to_string()));
            }

            let entry_point = ctx.resolve(&ctx.config.entry_point)?;
            tracing::debug!(url = %url, entry_point = %entry_point, "navigation offline, serving entry point");
            cached(ctx, &entry_point)
                .await
                .map(|doc| Routed::new(doc, ResponseSource::OfflineFallback))
                .ok_or_else(|| Error::Offline(url.to_string()))
        }
        Err(e) => Err(e),
    }
}

/// Wrap a network response, starting a cache write when it is a 2xx.
fn from_network(ctx: &WorkerContext, response: ResponseSnapshot) -> Routed {
    let cache_write = response
        .is_success()
        .then(|| spawn_store(ctx.db.clone(), ctx.dynamic_partition().to_string(), response.clone()));

    Routed { response, source: ResponseSource::Network, cache_write }
}

fn spawn_store(db: CacheDb, partition: String, snapshot: ResponseSnapshot) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = db.put(&partition, &snapshot).await {
            tracing::warn!(url = %snapshot.url, partition = %partition, error = %e, "cache write failed");
        }
    })
}

/// Look the URL up in the current partitions, in order. Storage errors count
/// as a miss.
async fn cached(ctx: &WorkerContext, url: &Url) -> Option<ResponseSnapshot> {
    match ctx.db.match_first(&ctx.lookup_order(), url.as_str()).await {
        Ok(hit) => hit.map(|(_, snapshot)| snapshot),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "cache lookup failed");
            None
        }
    }
}

/// Await a pending cache write, if any. Used by hosts that must not exit
/// before the write completes.
pub async fn settle(routed: &mut Routed) {
    if let Some(handle) = routed.cache_write.take()
        && let Err(e) = handle.await
    {
        tracing::warn!(error = %e, "cache write task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestMode;
    use crate::testing::{StubFetcher, ok, test_context};
    use std::sync::Arc;

    fn respond(outcome: FetchOutcome) -> Routed {
        match outcome {
            FetchOutcome::Respond(routed) => routed,
            FetchOutcome::Passthrough => panic!("expected a response"),
        }
    }

    async fn get(ctx: &WorkerContext, url: &str) -> Result<FetchOutcome, Error> {
        route(ctx, &InterceptedRequest::get(url).unwrap()).await
    }

    async fn navigate(ctx: &WorkerContext, url: &str) -> Result<FetchOutcome, Error> {
        route(ctx, &InterceptedRequest::navigate(url).unwrap()).await
    }

    #[tokio::test]
    async fn test_api_success_is_cached() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond("https://app.test/api/status", 200, "{\"ok\":true}");
        let ctx = test_context(fetcher.clone()).await;

        let mut routed = respond(get(&ctx, "https://app.test/api/status").await.unwrap());
        settle(&mut routed).await;

        assert_eq!(routed.source, ResponseSource::Network);
        assert_eq!(routed.response.body, b"{\"ok\":true}");
        let stored = ctx.db.match_in("app-dynamic-v2", "https://app.test/api/status").await.unwrap();
        assert_eq!(stored.map(|s| s.body), Some(b"{\"ok\":true}".to_vec()));
    }

    #[tokio::test]
    async fn test_api_always_hits_network_even_when_cached() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond("https://app.test/api/status", 200, "fresh");
        let ctx = test_context(fetcher.clone()).await;
        ctx.db.put("app-dynamic-v2", &ok("https://app.test/api/status", "stale")).await.unwrap();

        let mut routed = respond(get(&ctx, "https://app.test/api/status").await.unwrap());
        settle(&mut routed).await;

        assert_eq!(routed.response.body, b"fresh");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_api_offline_serves_cached_snapshot() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.fail("https://app.test/api/status");
        let ctx = test_context(fetcher).await;
        ctx.db.put("app-dynamic-v2", &ok("https://app.test/api/status", "prior")).await.unwrap();

        let routed = respond(get(&ctx, "https://app.test/api/status").await.unwrap());

        assert_eq!(routed.source, ResponseSource::Cache);
        assert_eq!(routed.response.body, b"prior");
    }

    #[tokio::test]
    async fn test_api_offline_without_cache_is_offline_error() {
        let ctx = test_context(Arc::new(StubFetcher::new())).await;

        let result = get(&ctx, "https://app.test/api/status").await;

        assert!(matches!(result, Err(Error::Offline(_))));
    }

    #[tokio::test]
    async fn test_api_error_status_is_returned_without_fallback() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond("https://app.test/api/status", 503, "down");
        let ctx = test_context(fetcher).await;
        ctx.db.put("app-dynamic-v2", &ok("https://app.test/api/status", "prior")).await.unwrap();

        let routed = respond(get(&ctx, "https://app.test/api/status").await.unwrap());

        assert_eq!(routed.source, ResponseSource::Network);
        assert_eq!(routed.response.status, 503);
        assert!(routed.cache_write.is_none());
    }

    #[tokio::test]
    async fn test_api_navigation_offline_does_not_use_entry_point() {
        let ctx = test_context(Arc::new(StubFetcher::new())).await;
        ctx.db.put("app-static-v2", &ok("https://app.test/index.html", "<html>")).await.unwrap();

        let result = navigate(&ctx, "https://app.test/api/status").await;

        assert!(matches!(result, Err(Error::Offline(_))));
    }

    #[tokio::test]
    async fn test_asset_hit_skips_network() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond("https://app.test/app.js", 200, "new");
        let ctx = test_context(fetcher.clone()).await;
        ctx.db.put("app-static-v2", &ok("https://app.test/app.js", "old")).await.unwrap();

        let routed = respond(get(&ctx, "https://app.test/app.js").await.unwrap());

        assert_eq!(routed.source, ResponseSource::Cache);
        assert_eq!(routed.response.body, b"old");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_asset_lookup_prefers_static_partition() {
        let ctx = test_context(Arc::new(StubFetcher::new())).await;
        ctx.db.put("app-dynamic-v2", &ok("https://app.test/app.js", "dynamic")).await.unwrap();
        ctx.db.put("app-static-v2", &ok("https://app.test/app.js", "static")).await.unwrap();

        let routed = respond(get(&ctx, "https://app.test/app.js").await.unwrap());

        assert_eq!(routed.response.body, b"static");
    }

    #[tokio::test]
    async fn test_asset_ignores_stale_generation() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond("https://app.test/app.js", 200, "current");
        let ctx = test_context(fetcher.clone()).await;
        ctx.db.put("app-static-v1", &ok("https://app.test/app.js", "stale")).await.unwrap();

        let routed = respond(get(&ctx, "https://app.test/app.js").await.unwrap());

        assert_eq!(routed.response.body, b"current");
        assert_eq!(fetcher.calls_to("https://app.test/app.js"), 1);
    }

    #[tokio::test]
    async fn test_asset_miss_is_fetched_and_stored() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond("https://app.test/logo.png", 200, "png");
        let ctx = test_context(fetcher.clone()).await;

        let mut first = respond(get(&ctx, "https://app.test/logo.png").await.unwrap());
        settle(&mut first).await;
        let second = respond(get(&ctx, "https://app.test/logo.png").await.unwrap());

        assert_eq!(first.source, ResponseSource::Network);
        assert_eq!(second.source, ResponseSource::Cache);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_asset_not_found_is_returned_uncached() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond("https://app.test/unknown.png", 404, "nope");
        let ctx = test_context(fetcher).await;

        let routed = respond(get(&ctx, "https://app.test/unknown.png").await.unwrap());

        assert_eq!(routed.response.status, 404);
        assert!(routed.cache_write.is_none());
        assert!(ctx.db.match_in("app-dynamic-v2", "https://app.test/unknown.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_navigation_offline_serves_entry_point() {
        let ctx = test_context(Arc::new(StubFetcher::new())).await;
        ctx.db.put("app-static-v2", &ok("https://app.test/index.html", "<html>shell")).await.unwrap();

        let routed = respond(navigate(&ctx, "https://app.test/notes/42").await.unwrap());

        assert_eq!(routed.source, ResponseSource::OfflineFallback);
        assert_eq!(routed.response.body, b"<html>shell");
    }

    #[tokio::test]
    async fn test_navigation_offline_without_entry_point() {
        let ctx = test_context(Arc::new(StubFetcher::new())).await;

        let result = navigate(&ctx, "https://app.test/notes/42").await;

        assert!(matches!(result, Err(Error::Offline(_))));
    }

    #[tokio::test]
    async fn test_subresource_offline_miss_is_offline_error() {
        let ctx = test_context(Arc::new(StubFetcher::new())).await;
        ctx.db.put("app-static-v2", &ok("https://app.test/index.html", "<html>")).await.unwrap();

        let result = get(&ctx, "https://app.test/missing.css").await;

        assert!(matches!(result, Err(Error::Offline(_))));
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_block_network_answers() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher
            .respond("https://app.test/api/status", 200, "up")
            .respond("https://app.test/logo.png", 200, "png");
        let ctx = test_context(fetcher.clone()).await;
        ctx.db.drop_tables().await.unwrap();

        let mut api = respond(get(&ctx, "https://app.test/api/status").await.unwrap());
        let mut asset = respond(get(&ctx, "https://app.test/logo.png").await.unwrap());
        settle(&mut api).await;
        settle(&mut asset).await;

        assert_eq!((api.response.status, api.source), (200, ResponseSource::Network));
        assert_eq!((asset.response.status, asset.source), (200, ResponseSource::Network));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_storage_failure_while_offline_is_offline_error() {
        let ctx = test_context(Arc::new(StubFetcher::new())).await;
        ctx.db.drop_tables().await.unwrap();

        assert!(matches!(get(&ctx, "https://app.test/api/status").await, Err(Error::Offline(_))));
        assert!(matches!(navigate(&ctx, "https://app.test/notes/42").await, Err(Error::Offline(_))));
    }

    #[tokio::test]
    async fn test_passthrough_makes_no_calls() {
        let fetcher = Arc::new(StubFetcher::new());
        let ctx = test_context(fetcher.clone()).await;

        let post = InterceptedRequest::new("POST", "https://app.test/api/notes", RequestMode::Cors).unwrap();
        let foreign = InterceptedRequest::get("https://fonts.test/font.woff2").unwrap();

        assert!(matches!(route(&ctx, &post).await.unwrap(), FetchOutcome::Passthrough));
        assert!(matches!(route(&ctx, &foreign).await.unwrap(), FetchOutcome::Passthrough));
        assert_eq!(fetcher.calls(), 0);
    }
}
