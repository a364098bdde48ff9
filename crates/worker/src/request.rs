//! Intercepted request descriptors and classification.

use serde::{Deserialize, Serialize};
use tether_client::{canonicalize, same_origin};
use tether_core::Error;
use url::Url;

use crate::context::WorkerContext;

/// How the host issued the request. Only `Navigate` changes routing: it
/// enables the offline entry-point fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level page load.
    Navigate,
    #[default]
    SameOrigin,
    NoCors,
    Cors,
}

impl std::str::FromStr for RequestMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "navigate" => Ok(Self::Navigate),
            "same-origin" => Ok(Self::SameOrigin),
            "no-cors" => Ok(Self::NoCors),
            "cors" => Ok(Self::Cors),
            other => Err(Error::InvalidInput(format!("unknown request mode: {other}"))),
        }
    }
}

/// An outbound request as seen by the worker. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    method: String,
    url: Url,
    mode: RequestMode,
}

impl InterceptedRequest {
    /// Build a request descriptor from raw parts.
    ///
    /// The method is upper-cased and the URL canonicalized so the same
    /// resource always maps to the same cache key.
    pub fn new(method: &str, url: &str, mode: RequestMode) -> Result<Self, Error> {
        let url = canonicalize(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self { method: method.trim().to_ascii_uppercase(), url, mode })
    }

    pub fn get(url: &str) -> Result<Self, Error> {
        Self::new("GET", url, RequestMode::SameOrigin)
    }

    pub fn navigate(url: &str) -> Result<Self, Error> {
        Self::new("GET", url, RequestMode::Navigate)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// Routing decision for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    /// Not ours to handle: non-GET or another origin.
    Passthrough,
    /// API call, served network-first.
    Api,
    /// Anything else on our origin, served cache-first.
    Asset,
}

impl RequestClass {
    /// Classify a request.
    ///
    /// Method and origin are checked first; among intercepted requests the
    /// API prefix is tested before anything else so API calls never reach
    /// the app-shell fallback.
    pub fn of(ctx: &WorkerContext, request: &InterceptedRequest) -> Self {
        if request.method() != "GET" || !same_origin(request.url(), ctx.origin()) {
            return Self::Passthrough;
        }

        if request.url().path().starts_with(&ctx.config.api_prefix) {
            Self::Api
        } else {
            Self::Asset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubFetcher, test_context};
    use std::sync::Arc;

    #[test]
    fn test_request_normalizes_method_and_url() {
        let request = InterceptedRequest::new(" get ", "https://APP.test/a#frag", RequestMode::Cors).unwrap();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.url().as_str(), "https://app.test/a");
        assert!(!request.is_navigation());
    }

    #[test]
    fn test_request_mode_parse() {
        assert_eq!("navigate".parse::<RequestMode>().unwrap(), RequestMode::Navigate);
        assert_eq!("no-cors".parse::<RequestMode>().unwrap(), RequestMode::NoCors);
        assert!("websocket".parse::<RequestMode>().is_err());
    }

    #[test]
    fn test_request_rejects_relative_url() {
        assert!(matches!(InterceptedRequest::get("/index.html"), Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_classify() {
        let ctx = test_context(Arc::new(StubFetcher::new())).await;
        let class = |method: &str, url: &str| {
            RequestClass::of(&ctx, &InterceptedRequest::new(method, url, RequestMode::SameOrigin).unwrap())
        };

        assert_eq!(class("GET", "https://app.test/api/status"), RequestClass::Api);
        assert_eq!(class("GET", "https://app.test/app.js"), RequestClass::Asset);
        assert_eq!(class("GET", "https://app.test/apix"), RequestClass::Asset);
        assert_eq!(class("POST", "https://app.test/api/notes"), RequestClass::Passthrough);
        assert_eq!(class("GET", "https://cdn.test/api/status"), RequestClass::Passthrough);
        assert_eq!(class("GET", "http://app.test/app.js"), RequestClass::Passthrough);
    }
}
