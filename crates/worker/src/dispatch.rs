//! Lifecycle entry points.
//!
//! A [`Dispatcher`] is the only thing a host talks to. Every method takes an
//! immutable event descriptor and can be called concurrently.

use std::sync::Arc;

use chrono::Utc;
use tether_core::Error;

use crate::context::{LifecycleState, WorkerContext};
use crate::evict::{self, EvictionReport};
use crate::generation::{self, ActivationReport};
use crate::notify::{ClickOutcome, EXPLORE_ACTION, Notification, Notifier};
use crate::preload::{self, InstallReport};
use crate::replay::{self, ReplayReport};
use crate::request::InterceptedRequest;
use crate::router::{self, FetchOutcome};

#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<WorkerContext>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(ctx: Arc<WorkerContext>, notifier: Arc<dyn Notifier>) -> Self {
        Self { ctx, notifier }
    }

    pub fn context(&self) -> &Arc<WorkerContext> {
        &self.ctx
    }

    /// Preload the manifest.
    ///
    /// A failed install restores the previous state so the host can retry.
    /// Re-installing while activating or activated refreshes the static
    /// partition without giving up control of requests.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` if another install is in progress.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        use LifecycleState::{Activated, Activating, Installed, Installing, Parsed};

        let previous = match self.ctx.transition(&[Parsed, Installed], Installing).await {
            Ok(previous) => Some(previous),
            Err(Activating | Activated) => None,
            Err(state) => return Err(Error::InvalidState(format!("cannot install while {state:?}"))),
        };

        let result = preload::install(&self.ctx).await;

        // Only settle a transition this call started; a concurrent activate
        // may have moved on since.
        if let Some(previous) = previous {
            let next = if result.is_ok() { Installed } else { previous };
            if let Err(state) = self.ctx.transition(&[Installing], next).await {
                tracing::debug!(state = ?state, "lifecycle moved on during install");
            }
        }

        result
    }

    /// Remove older generations and start intercepting requests.
    ///
    /// An already activated worker stays activated while it cleans up.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` if install has not completed.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        use LifecycleState::{Activated, Activating, Installed};

        let started = match self.ctx.transition(&[Installed], Activating).await {
            Ok(_) => true,
            Err(Activated) => false,
            Err(state) => return Err(Error::InvalidState(format!("cannot activate while {state:?}"))),
        };

        let result = generation::cleanup(&self.ctx).await;

        if started {
            let next = if result.is_ok() { Activated } else { Installed };
            if let Err(state) = self.ctx.transition(&[Activating], next).await {
                tracing::warn!(state = ?state, "lifecycle moved on during activate");
            }
        }

        result
    }

    /// Route a request. Until activation every request passes through.
    pub async fn fetch(&self, request: &InterceptedRequest) -> Result<FetchOutcome, Error> {
        if self.ctx.state().await != LifecycleState::Activated {
            return Ok(FetchOutcome::Passthrough);
        }
        router::route(&self.ctx, request).await
    }

    /// Replay pending requests. Returns `None` for tags other than the
    /// configured sync tag.
    pub async fn sync(&self, tag: &str) -> Result<Option<ReplayReport>, Error> {
        if tag != self.ctx.config.sync_tag {
            tracing::debug!(tag, "ignoring sync tag");
            return Ok(None);
        }
        replay::replay_pending(&self.ctx).await.map(Some)
    }

    /// Handle a command message: `{"type": "<command>"}`.
    ///
    /// Only the clean command does anything; it runs an eviction pass.
    pub async fn message(&self, message: &serde_json::Value) -> Result<Option<EvictionReport>, Error> {
        let command = message.get("type").and_then(serde_json::Value::as_str);
        if command != Some(self.ctx.config.clean_command.as_str()) {
            tracing::debug!(?command, "ignoring message");
            return Ok(None);
        }
        evict::evict_stale(&self.ctx, Utc::now()).await.map(Some)
    }

    /// Show the update notification for a push.
    pub async fn push(&self, payload: Option<&str>) -> Result<Notification, Error> {
        let notification = Notification::for_push(&self.ctx.config, payload, Utc::now());
        self.notifier.show(&notification).await?;
        Ok(notification)
    }

    /// React to a notification click. `explore` opens the app root; any
    /// other action, or none, just dismisses.
    pub async fn notification_click(&self, action: Option<&str>) -> Result<ClickOutcome, Error> {
        if action != Some(EXPLORE_ACTION) {
            return Ok(ClickOutcome::Dismissed);
        }

        let root = self.ctx.resolve("/")?;
        self.notifier.open_window(&root).await?;
        Ok(ClickOutcome::Opened(root))
    }
}
