//! fetch tool implementation.
//!
//! Hands one request to the worker and reports what it did with it.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tether_worker::{Dispatcher, FetchOutcome, InterceptedRequest, RequestMode, ResponseSource};

use super::json_result;
use crate::error::ToolError;

/// Input parameters for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Absolute URL of the request.
    pub url: String,

    /// HTTP method (default: GET). Anything but GET passes through.
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate", "same-origin" (default), "no-cors" or "cors".
    #[serde(default)]
    pub mode: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutput {
    /// The worker did not intercept; the caller should send the request.
    Passthrough,
    Response {
        url: String,
        status: u16,
        headers: Vec<(String, String)>,
        body_base64: String,
        source: ResponseSource,
    },
}

pub async fn fetch_impl(dispatcher: &Dispatcher, params: FetchParams) -> Result<CallToolResult, McpError> {
    let mode = match params.mode.as_deref() {
        Some(mode) => mode.parse::<RequestMode>()?,
        None => RequestMode::default(),
    };

    if params.method.trim().is_empty() {
        return Err(ToolError::InvalidInput("method cannot be empty".into()).into());
    }

    let request = InterceptedRequest::new(&params.method, &params.url, mode)?;

    let output = match dispatcher.fetch(&request).await? {
        FetchOutcome::Passthrough => FetchOutput::Passthrough,
        FetchOutcome::Respond(routed) => FetchOutput::Response {
            url: routed.response.url,
            status: routed.response.status,
            headers: routed.response.headers,
            body_base64: STANDARD.encode(&routed.response.body),
            source: routed.source,
        },
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{decode, test_dispatcher};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params(url: String, mode: Option<&str>) -> FetchParams {
        FetchParams { url, method: default_method(), mode: mode.map(str::to_string) }
    }

    async fn activated(server: &MockServer) -> Dispatcher {
        Mock::given(method("GET"))
            .and(path("/index.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>shell"))
            .mount(server)
            .await;
        let dispatcher = test_dispatcher(&server.uri()).await;
        dispatcher.install().await.unwrap();
        dispatcher.activate().await.unwrap();
        dispatcher
    }

    #[tokio::test]
    async fn test_fetch_passthrough_before_activation() {
        let server = MockServer::start().await;
        let dispatcher = test_dispatcher(&server.uri()).await;

        let result = fetch_impl(&dispatcher, params(format!("{}/app.js", server.uri()), None)).await.unwrap();

        assert!(matches!(decode::<FetchOutput>(&result), FetchOutput::Passthrough));
    }

    #[tokio::test]
    async fn test_fetch_serves_installed_asset_from_cache() {
        let server = MockServer::start().await;
        let dispatcher = activated(&server).await;

        let result = fetch_impl(&dispatcher, params(format!("{}/index.html", server.uri()), None)).await.unwrap();

        match decode::<FetchOutput>(&result) {
            FetchOutput::Response { status, body_base64, source, .. } => {
                assert_eq!(status, 200);
                assert_eq!(source, ResponseSource::Cache);
                assert_eq!(STANDARD.decode(body_base64).unwrap(), b"<html>shell");
            }
            FetchOutput::Passthrough => panic!("expected a response"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_unknown_mode() {
        let server = MockServer::start().await;
        let dispatcher = activated(&server).await;

        let err = fetch_impl(&dispatcher, params(format!("{}/a", server.uri()), Some("websocket"))).await.unwrap_err();

        assert_eq!(err.code, rmcp::model::ErrorCode(-32602));
    }

    #[tokio::test]
    async fn test_fetch_non_get_passes_through() {
        let server = MockServer::start().await;
        let dispatcher = activated(&server).await;
        let post = FetchParams { url: format!("{}/api/notes", server.uri()), method: "POST".into(), mode: None };

        let result = fetch_impl(&dispatcher, post).await.unwrap();

        assert!(matches!(decode::<FetchOutput>(&result), FetchOutput::Passthrough));
    }
}
