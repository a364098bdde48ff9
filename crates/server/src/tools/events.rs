//! Event tools: sync, message, push and notification_click.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tether_worker::{Dispatcher, EvictionReport, ReplayReport};

use super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Sync tag. Only the configured tag triggers a replay.
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageParams {
    /// Command message, e.g. `{"type": "CLEAN_CACHE"}`.
    pub message: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Push payload text. Empty or missing uses the default body.
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Action the user picked ("explore" or "close"); absent for a plain click.
    #[serde(default)]
    pub action: Option<String>,
}

/// Result of an event the worker may ignore.
#[derive(Debug, Serialize, Deserialize)]
struct Handled<T> {
    handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<T>,
}

impl<T> From<Option<T>> for Handled<T> {
    fn from(report: Option<T>) -> Self {
        Self { handled: report.is_some(), report }
    }
}

pub async fn sync_impl(dispatcher: &Dispatcher, params: SyncParams) -> Result<CallToolResult, McpError> {
    let report: Option<ReplayReport> = dispatcher.sync(&params.tag).await?;
    json_result(&Handled::from(report))
}

pub async fn message_impl(dispatcher: &Dispatcher, params: MessageParams) -> Result<CallToolResult, McpError> {
    let report: Option<EvictionReport> = dispatcher.message(&params.message).await?;
    json_result(&Handled::from(report))
}

pub async fn push_impl(dispatcher: &Dispatcher, params: PushParams) -> Result<CallToolResult, McpError> {
    let notification = dispatcher.push(params.payload.as_deref()).await?;
    json_result(&notification)
}

pub async fn notification_click_impl(
    dispatcher: &Dispatcher, params: NotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let outcome = dispatcher.notification_click(params.action.as_deref()).await?;
    json_result(&outcome)
}
