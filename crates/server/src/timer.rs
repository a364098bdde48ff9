//! Periodic eviction.

use std::time::Duration;

use tether_worker::Dispatcher;

/// Send the clean command every `every`, starting one period after launch.
pub async fn eviction_timer(dispatcher: Dispatcher, every: Duration) {
    let command = serde_json::json!({ "type": dispatcher.context().config.clean_command });
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Err(e) = dispatcher.message(&command).await {
            tracing::warn!(error = %e, "scheduled eviction failed");
        }
    }
}
