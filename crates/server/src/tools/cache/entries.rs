//! cache_entries tool implementation.
//!
//! Lists the URLs stored in one partition.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tether_core::Error;
use tether_worker::Dispatcher;

use crate::tools::json_result;

/// Parameters for the cache_entries tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheEntriesParams {
    /// Partition name. Defaults to the current dynamic partition.
    #[serde(default)]
    pub partition: Option<String>,
}

/// Output from the cache_entries tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheEntriesOutput {
    pub partition: String,
    /// Stored URLs, oldest first.
    pub urls: Vec<String>,
}

pub async fn entries_impl(dispatcher: &Dispatcher, params: CacheEntriesParams) -> Result<CallToolResult, McpError> {
    let ctx = dispatcher.context();
    let partition = params.partition.unwrap_or_else(|| ctx.dynamic_partition().to_string());

    if !ctx.db.has_partition(&partition).await? {
        return Err(Error::CacheMiss(format!("no partition named {partition}")).into());
    }

    let urls = ctx.db.keys(&partition).await?;
    json_result(&CacheEntriesOutput { partition, urls })
}
