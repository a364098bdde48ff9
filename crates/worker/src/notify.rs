//! Push notification pass-through.
//!
//! The worker only shapes the notification and forwards it. Showing it and
//! opening windows belong to the host, behind [`Notifier`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tether_core::{AppConfig, Error};
use url::Url;

pub const DEFAULT_BODY: &str = "New update available!";
pub const EXPLORE_ACTION: &str = "explore";
pub const CLOSE_ACTION: &str = "close";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub arrived_at: DateTime<Utc>,
    pub primary_key: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Vibration pattern in milliseconds, alternating on and off.
    pub vibrate: Vec<u32>,
    pub actions: Vec<NotificationAction>,
    pub data: NotificationData,
}

impl Notification {
    /// Build the update notification for a push payload. An absent or blank
    /// payload falls back to [`DEFAULT_BODY`].
    pub fn for_push(config: &AppConfig, payload: Option<&str>, now: DateTime<Utc>) -> Self {
        let body = payload.map(str::trim).filter(|p| !p.is_empty()).unwrap_or(DEFAULT_BODY);
        let action = |action: &str, title: &str| NotificationAction {
            action: action.to_string(),
            title: title.to_string(),
            icon: config.icon.clone(),
        };

        Self {
            title: config.app_name.clone(),
            body: body.to_string(),
            icon: config.icon.clone(),
            badge: config.icon.clone(),
            vibrate: vec![100, 50, 100],
            actions: vec![action(EXPLORE_ACTION, "Open App"), action(CLOSE_ACTION, "Close")],
            data: NotificationData { arrived_at: now, primary_key: 1 },
        }
    }
}

/// What a notification click resulted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "url", rename_all = "snake_case")]
pub enum ClickOutcome {
    Opened(Url),
    Dismissed,
}

/// Host-side notification surface.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), Error>;

    async fn open_window(&self, url: &Url) -> Result<(), Error>;
}

/// Notifier for hosts without a notification UI: everything is logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, body = %notification.body, "notification");
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        tracing::info!(url = %url, "open window");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::test_config;
    use std::sync::Mutex;

    /// Records everything it is asked to do.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) shown: Mutex<Vec<Notification>>,
        pub(crate) opened: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn show(&self, notification: &Notification) -> Result<(), Error> {
            self.shown.lock().unwrap().push(notification.clone());
            Ok(())
        }

        async fn open_window(&self, url: &Url) -> Result<(), Error> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_push_with_payload() {
        let config = AppConfig { app_name: "Notes".into(), ..test_config() };
        let n = Notification::for_push(&config, Some("3 notes synced"), Utc::now());

        assert_eq!(n.title, "Notes");
        assert_eq!(n.body, "3 notes synced");
        assert_eq!(n.badge, config.icon);
        assert_eq!(n.actions.iter().map(|a| a.action.as_str()).collect::<Vec<_>>(), ["explore", "close"]);
    }

    #[test]
    fn test_push_without_payload_uses_default_body() {
        let config = test_config();

        assert_eq!(Notification::for_push(&config, None, Utc::now()).body, DEFAULT_BODY);
        assert_eq!(Notification::for_push(&config, Some("  "), Utc::now()).body, DEFAULT_BODY);
    }

    #[test]
    fn test_click_outcome_serializes_tagged() {
        let opened = ClickOutcome::Opened(Url::parse("https://app.test/").unwrap());

        assert_eq!(
            serde_json::to_value(&opened).unwrap(),
            serde_json::json!({"outcome": "opened", "url": "https://app.test/"})
        );
        assert_eq!(serde_json::to_value(ClickOutcome::Dismissed).unwrap(), serde_json::json!({"outcome": "dismissed"}));
    }
}
