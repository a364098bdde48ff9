//! Manifest preloading for the install step.
//!
//! Every manifest asset is fetched before anything is written. The batch is
//! then stored in a single transaction, so a failed install leaves the
//! static partition exactly as it was.

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tether_core::{Error, ResponseSnapshot};

use crate::context::WorkerContext;

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    pub partition: String,
    /// Absolute URLs now present in the static partition.
    pub cached: Vec<String>,
}

/// Fetch the whole manifest and store it in the static partition.
///
/// # Errors
///
/// Returns `Error::InstallFailed` naming the first asset that could not be
/// fetched or answered with a non-2xx status. Storage errors are returned
/// as-is. Nothing is written in either case.
pub async fn install(ctx: &WorkerContext) -> Result<InstallReport, Error> {
    let targets = ctx
        .config
        .manifest
        .iter()
        .map(|path| ctx.resolve(path).map(|url| (path.as_str(), url)))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        partition = ctx.static_partition(),
        assets = targets.len(),
        "caching static assets"
    );

    let fetches = targets.iter().map(|(path, url)| async move {
        match ctx.fetcher.get(url).await {
            Ok(snapshot) if snapshot.is_success() => Ok(snapshot),
            Ok(snapshot) => {
                Err(Error::InstallFailed { url: path.to_string(), reason: format!("status {}", snapshot.status) })
            }
            Err(e) => Err(Error::InstallFailed { url: path.to_string(), reason: e.to_string() }),
        }
    });

    let snapshots: Vec<ResponseSnapshot> = try_join_all(fetches).await.inspect_err(|e| {
        tracing::warn!(error = %e, "install aborted");
    })?;

    let cached = snapshots.iter().map(|s| s.url.clone()).collect();
    ctx.db.put_all(ctx.static_partition(), snapshots).await?;

    Ok(InstallReport { partition: ctx.static_partition().to_string(), cached })
}
