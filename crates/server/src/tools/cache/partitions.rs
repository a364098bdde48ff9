//! cache_partitions tool implementation.
//!
//! Lists every partition with its entry count, marking the current pair.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tether_core::PartitionInfo;
use tether_worker::Dispatcher;

use crate::tools::json_result;

/// Output from the cache_partitions tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePartitionsOutput {
    pub static_partition: String,
    pub dynamic_partition: String,
    /// All stored partitions in creation order, current or not.
    pub partitions: Vec<PartitionInfo>,
}

pub async fn partitions_impl(dispatcher: &Dispatcher) -> Result<CallToolResult, McpError> {
    let ctx = dispatcher.context();
    let partitions = ctx.db.partition_stats().await?;

    json_result(&CachePartitionsOutput {
        static_partition: ctx.static_partition().to_string(),
        dynamic_partition: ctx.dynamic_partition().to_string(),
        partitions,
    })
}
