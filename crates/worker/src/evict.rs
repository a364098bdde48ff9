//! Age-based eviction of the dynamic partition.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tether_core::Error;

use crate::context::WorkerContext;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionReport {
    pub scanned: usize,
    /// URLs removed because their `date` header was older than the max age.
    pub evicted: Vec<String>,
    /// Entries kept because they carry no parseable `date` header.
    pub undated: usize,
}

/// Remove dynamic entries whose `date` header is older than `max_age`,
/// measured from `now`.
///
/// The static partition is never touched. Entries without a usable date
/// are kept, and a failed delete is logged without stopping the scan.
///
/// # Errors
///
/// Returns an error if the dynamic partition cannot be read.
pub async fn evict_stale(ctx: &WorkerContext, now: DateTime<Utc>) -> Result<EvictionReport, Error> {
    let max_age = TimeDelta::from_std(ctx.config.max_age())
        .map_err(|e| Error::InvalidInput(format!("max_age out of range: {e}")))?;
    let partition = ctx.dynamic_partition();
    let entries = ctx.db.entries(partition).await?;

    let mut report = EvictionReport { scanned: entries.len(), ..Default::default() };

    for entry in entries {
        let Some(captured) = entry.captured_at() else {
            report.undated += 1;
            continue;
        };

        if now - captured <= max_age {
            continue;
        }

        match ctx.db.delete(partition, &entry.url).await {
            Ok(_) => report.evicted.push(entry.url),
            Err(e) => tracing::warn!(url = %entry.url, error = %e, "failed to evict entry"),
        }
    }

    tracing::info!(
        partition,
        scanned = report.scanned,
        evicted = report.evicted.len(),
        undated = report.undated,
        "eviction pass complete"
    );

    Ok(report)
}
