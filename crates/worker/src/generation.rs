//! Generation cleanup for the activate step.

use serde::{Deserialize, Serialize};
use tether_core::Error;

use crate::context::WorkerContext;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationReport {
    /// Partitions removed because their name is not a current one.
    pub deleted: Vec<String>,
}

/// Delete every partition that is neither the current static nor the
/// current dynamic partition.
///
/// Names are compared for exact equality. A partition that fails to delete
/// is logged and skipped; it stays unreachable because lookups only read
/// current partitions, and the next activation retries it. A partition
/// already gone by the time it is deleted is not reported.
///
/// # Errors
///
/// Returns an error only if the partition list cannot be read.
pub async fn cleanup(ctx: &WorkerContext) -> Result<ActivationReport, Error> {
    let current = ctx.lookup_order();
    let mut report = ActivationReport::default();

    for name in ctx.db.partition_names().await? {
        if current.contains(&name) {
            continue;
        }

        match ctx.db.delete_partition(&name).await {
            Ok(true) => {
                tracing::info!(partition = %name, "deleted old cache");
                report.deleted.push(name);
            }
            Ok(false) => tracing::debug!(partition = %name, "old cache already deleted"),
            Err(e) => tracing::warn!(partition = %name, error = %e, "failed to delete old cache"),
        }
    }

    Ok(report)
}
