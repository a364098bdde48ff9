//! Background-sync replay of the dynamic partition.
//!
//! Each stored request is re-sent. A 2xx answer reconciles it and the entry
//! is removed; anything else leaves it for the next sync. Entries are
//! independent: one failure never stops the rest.

use serde::{Deserialize, Serialize};
use tether_core::Error;
use url::Url;

use crate::context::WorkerContext;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub attempted: usize,
    /// Entries answered with a 2xx and removed.
    pub reconciled: Vec<String>,
    /// Entries left in place for the next sync.
    pub failed: Vec<String>,
}

/// Replay every entry of the dynamic partition.
///
/// # Errors
///
/// Returns an error only if the pending keys cannot be listed.
pub async fn replay_pending(ctx: &WorkerContext) -> Result<ReplayReport, Error> {
    let partition = ctx.dynamic_partition();
    let pending = ctx.db.keys(partition).await?;
    let mut report = ReplayReport { attempted: pending.len(), ..Default::default() };

    for url in pending {
        if replay_one(ctx, &url).await {
            report.reconciled.push(url);
        } else {
            report.failed.push(url);
        }
    }

    tracing::info!(
        partition,
        attempted = report.attempted,
        reconciled = report.reconciled.len(),
        failed = report.failed.len(),
        "sync replay complete"
    );

    Ok(report)
}

async fn replay_one(ctx: &WorkerContext, raw: &str) -> bool {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(url = raw, error = %e, "stored key is not a url");
            return false;
        }
    };

    match ctx.fetcher.get(&url).await {
        Ok(response) if response.is_success() => match ctx.db.delete(ctx.dynamic_partition(), raw).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(url = raw, error = %e, "failed to remove reconciled entry");
                false
            }
        },
        Ok(response) => {
            tracing::debug!(url = raw, status = response.status, "replay not accepted");
            false
        }
        Err(e) => {
            tracing::debug!(url = raw, error = %e, "replay failed");
            false
        }
    }
}
