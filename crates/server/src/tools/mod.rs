//! MCP tool implementations.
//!
//! Each lifecycle signal of the worker is one tool. Results are returned as
//! pretty-printed JSON text content.

pub mod cache;
pub mod events;
pub mod fetch;
pub mod lifecycle;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Decode the JSON text of a tool result. Test helper.
#[cfg(test)]
pub(crate) fn decode<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content.get("text").and_then(|v| v.as_str()).expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}

/// Dispatcher over an in-memory cache and a local mock origin. Test helper.
#[cfg(test)]
pub(crate) async fn test_dispatcher(origin: &str) -> tether_worker::Dispatcher {
    use std::sync::Arc;
    use tether_client::{FetchClient, FetchConfig};
    use tether_core::{AppConfig, CacheDb};
    use tether_worker::{TracingNotifier, WorkerContext};

    let config = AppConfig {
        origin: origin.to_string(),
        cache_prefix: "app".into(),
        version: "v1".into(),
        manifest: vec!["/index.html".into()],
        ..Default::default()
    };
    let db = CacheDb::open_in_memory().await.unwrap();
    let client = FetchClient::new(FetchConfig::from(&config)).unwrap();
    let ctx = WorkerContext::new(config, db, Arc::new(client)).unwrap();
    tether_worker::Dispatcher::new(Arc::new(ctx), Arc::new(TracingNotifier))
}
