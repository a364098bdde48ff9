//! install and activate tools.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;
use tether_worker::{ActivationReport, Dispatcher, InstallReport, LifecycleState};

use super::json_result;

#[derive(Debug, Serialize)]
struct LifecycleOutput<T> {
    state: LifecycleState,
    #[serde(flatten)]
    report: T,
}

pub async fn install_impl(dispatcher: &Dispatcher) -> Result<CallToolResult, McpError> {
    let report: InstallReport = dispatcher.install().await?;
    json_result(&LifecycleOutput { state: dispatcher.context().state().await, report })
}

pub async fn activate_impl(dispatcher: &Dispatcher) -> Result<CallToolResult, McpError> {
    let report: ActivationReport = dispatcher.activate().await?;
    json_result(&LifecycleOutput { state: dispatcher.context().state().await, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{decode, test_dispatcher};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_install_then_activate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;
        let dispatcher = test_dispatcher(&server.uri()).await;

        let installed: serde_json::Value = decode(&install_impl(&dispatcher).await.unwrap());
        assert_eq!(installed["state"], "installed");
        assert_eq!(installed["partition"], "app-static-v1");

        let activated: serde_json::Value = decode(&activate_impl(&dispatcher).await.unwrap());
        assert_eq!(activated["state"], "activated");
        assert_eq!(activated["deleted"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_install_failure_is_tool_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let dispatcher = test_dispatcher(&server.uri()).await;

        let err = install_impl(&dispatcher).await.unwrap_err();
        assert!(err.message.starts_with("INSTALL_FAILED"));
    }

    #[tokio::test]
    async fn test_activate_before_install_is_rejected() {
        let dispatcher = test_dispatcher("http://127.0.0.1:9").await;

        let err = activate_impl(&dispatcher).await.unwrap_err();
        assert_eq!(err.code.0, -32007);
    }
}
