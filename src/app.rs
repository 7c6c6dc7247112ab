use tokio_util::sync::CancellationToken;
use tracing::info;

use petrocalc::config::Config;
use petrocalc::download::{DownloadSink, FetchConfig, FileDownloader};
use petrocalc::storage::{ArtifactKeys, ArtifactStore, StorageClient};
use petrocalc::validation::CandidateFile;
use petrocalc::workflow::{Workflow, WorkflowState, retrieve_artifacts};

use crate::cli::{DownloadArgs, RunArgs};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(mut config: Config, args: RunArgs) -> Result<(), AnyError> {
    if let Some(dir) = args.output_dir {
        config.download.output_dir = dir;
    }

    let mut workflow = Workflow::from_config(&config)?;
    tokio::spawn(cancel_on_signal(workflow.cancel_token()));
    tokio::spawn(report_status(workflow.subscribe()));

    let candidate = CandidateFile::from_path(&args.file).await?;
    workflow.select_file(candidate)?;

    for (field, value) in args.constants.provided() {
        workflow.set_constant(field, value);
    }

    let result = workflow.submit().await?;
    info!(payload = %result.payload, "Job completed");

    if args.no_download {
        return Ok(());
    }

    for artifact in workflow.download().await? {
        println!("{} -> {} ({} bytes)", artifact.file_name, artifact.target, artifact.size);
    }

    Ok(())
}

/// Re-fetch both artifacts of an earlier run without resubmitting
pub async fn download(mut config: Config, args: DownloadArgs) -> Result<(), AnyError> {
    if let Some(dir) = args.output_dir {
        config.download.output_dir = dir;
    }

    let storage = StorageClient::from_config(&config.storage)?;
    let downloader = FileDownloader::new(FetchConfig::from(&config.download))?;
    let keys = ArtifactKeys::for_file_name(storage.bucket(), &args.file_name);

    let delivered = retrieve_artifacts(
        &storage,
        &downloader as &dyn DownloadSink,
        &keys,
        config.download.link_ttl.as_duration(),
        config.download.gap.as_duration(),
    )
    .await?;

    for artifact in delivered {
        println!("{} -> {} ({} bytes)", artifact.file_name, artifact.target, artifact.size);
    }

    Ok(())
}

pub fn show_config(config: &Config) -> Result<(), AnyError> {
    print!("{}", config.to_toml()?);
    Ok(())
}

async fn report_status(mut status: tokio::sync::watch::Receiver<WorkflowState>) {
    while status.changed().await.is_ok() {
        let state = status.borrow_and_update().clone();
        match state {
            WorkflowState::Failed(message) => eprintln!("Failed: {}", message),
            other => eprintln!("{}", other.label()),
        }
    }
}

async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, cancelling workflow");
    token.cancel();
}
