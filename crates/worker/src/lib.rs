//! Caching and fallback policy engine.
//!
//! The worker sits between an application and the network. Each lifecycle
//! signal the host delivers maps to one entry point on [`Dispatcher`]:
//!
//! - install: preload the manifest into the static partition
//! - activate: drop partitions of older generations and take control
//! - fetch: route a request through cache-first or network-first
//! - sync: replay pending entries of the dynamic partition
//! - message: evict stale dynamic entries on the clean command
//! - push / notification click: hand off to a [`Notifier`]

pub mod context;
pub mod dispatch;
pub mod evict;
pub mod generation;
pub mod notify;
pub mod preload;
pub mod replay;
pub mod request;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{LifecycleState, WorkerContext};
pub use dispatch::Dispatcher;
pub use evict::EvictionReport;
pub use generation::ActivationReport;
pub use notify::{ClickOutcome, Notification, NotificationAction, NotificationData, Notifier, TracingNotifier};
pub use preload::InstallReport;
pub use replay::ReplayReport;
pub use request::{InterceptedRequest, RequestClass, RequestMode};
pub use router::{FetchOutcome, ResponseSource, Routed, settle};
