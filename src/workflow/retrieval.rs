use std::time::Duration;
use tracing::info;

use crate::download::{Delivered, DownloadError, DownloadSink};
use crate::storage::{ArtifactKeys, ArtifactStore};

/// Deliver the plots artifact, wait `gap`, then deliver the data artifact.
///
/// Each link is issued right before its own delivery, so a slow plots
/// transfer cannot eat into the data link's lifetime. The first failure
/// aborts the rest.
pub async fn retrieve_artifacts(
    storage: &dyn ArtifactStore,
    sink: &dyn DownloadSink,
    keys: &ArtifactKeys,
    ttl: Duration,
    gap: Duration,
) -> Result<Vec<Delivered>, DownloadError> {
    let plots_link = storage.signed_url(&keys.plots, ttl).await?;
    let plots = sink.deliver(&plots_link, keys.plots_file_name()).await?;
    info!(file = %plots.file_name, target = %plots.target, "Plots delivered");

    tokio::time::sleep(gap).await;

    let data_link = storage.signed_url(&keys.data, ttl).await?;
    let data = sink.deliver(&data_link, keys.data_file_name()).await?;
    info!(file = %data.file_name, target = %data.target, "Data delivered");

    Ok(vec![plots, data])
}
