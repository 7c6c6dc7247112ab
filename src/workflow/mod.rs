//! Upload → process → retrieve state machine
//!
//! ```text
//!            select_file
//!             ┌──────┐
//!             ▼      │
//!           Idle ────┘
//!             │ submit
//!             ▼
//!        Uploading ──── store fails ────┐
//!             │ stored                  ▼
//!             ▼                       Failed
//!        Processing ─── job fails ──────▲
//!             │ job ok                  │
//!             ▼                         │
//!      Ready(result) ◄── download       │
//!             │                         │
//!             └──── reset ──► Idle ◄────┘ reset
//! ```
//!
//! All state lives in one [`Workflow`] and only changes through its methods.
//! `submit` and `download` borrow the workflow mutably, so a second
//! submission cannot start while one is in flight. Status changes are
//! published on a `watch` channel for whatever renders them.

mod retrieval;
mod state;

pub use retrieval::retrieve_artifacts;
pub use state::{WorkflowError, WorkflowState};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::{Config, ConstantsPolicy};
use crate::download::{Delivered, DownloadSink, FetchConfig, FileDownloader};
use crate::humanize::ByteSize;
use crate::job::{ColumnNames, HttpJobInvoker, InvokerConfig, JobError, JobInvoker, JobRequest, JobResult};
use crate::observability::Metrics;
use crate::storage::{ArtifactKeys, ArtifactStore, StorageClient};
use crate::validation::{
    CandidateFile, ConstantField, ConstantsConfig, ParsedConstants, UploadableFile,
    ValidationError, parse_constants, validate_file,
};

/// Knobs the workflow reads on every run
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub columns: ColumnNames,
    pub link_ttl: Duration,
    /// Pause between the two artifact deliveries
    pub download_gap: Duration,
    /// Upper bound for the remote job
    pub job_timeout: Duration,
    pub max_file_bytes: ByteSize,
    pub constants_policy: ConstantsPolicy,
}

impl From<&Config> for WorkflowSettings {
    fn from(config: &Config) -> Self {
        Self {
            columns: ColumnNames::from(&config.columns),
            link_ttl: config.download.link_ttl.as_duration(),
            download_gap: config.download.gap.as_duration(),
            job_timeout: config.processing.request_timeout.as_duration(),
            max_file_bytes: config.limits.max_file_bytes,
            constants_policy: config.limits.constants_policy,
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

pub struct Workflow {
    storage: Arc<dyn ArtifactStore>,
    invoker: Arc<dyn JobInvoker>,
    sink: Arc<dyn DownloadSink>,
    settings: WorkflowSettings,
    metrics: Arc<Metrics>,
    cancel: CancellationToken,
    state: WorkflowState,
    selected: Option<UploadableFile>,
    constants: ConstantsConfig,
    notice: Option<String>,
    status: watch::Sender<WorkflowState>,
}

impl Workflow {
    pub fn new(
        storage: Arc<dyn ArtifactStore>,
        invoker: Arc<dyn JobInvoker>,
        sink: Arc<dyn DownloadSink>,
        settings: WorkflowSettings,
    ) -> Self {
        let (status, _) = watch::channel(WorkflowState::Idle);

        Self {
            storage,
            invoker,
            sink,
            settings,
            metrics: Arc::new(Metrics::new()),
            cancel: CancellationToken::new(),
            state: WorkflowState::Idle,
            selected: None,
            constants: ConstantsConfig::default(),
            notice: None,
            status,
        }
    }

    /// Wire the S3 client, HTTP invoker and file downloader from configuration
    pub fn from_config(config: &Config) -> Result<Self, WorkflowError> {
        let storage = StorageClient::from_config(&config.storage)?;
        let invoker = HttpJobInvoker::new(InvokerConfig::from(&config.processing))?;
        let downloader = FileDownloader::new(FetchConfig::from(&config.download))?;

        Ok(Self::new(
            Arc::new(storage),
            Arc::new(invoker),
            Arc::new(downloader),
            WorkflowSettings::from(config),
        ))
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn selected_file(&self) -> Option<&UploadableFile> {
        self.selected.as_ref()
    }

    pub fn constants(&self) -> &ConstantsConfig {
        &self.constants
    }

    /// Latest user-facing error, cleared by the next successful action
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn result(&self) -> Option<&JobResult> {
        self.state.result()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Receiver that always holds the current state
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.status.subscribe()
    }

    /// Token that aborts the current submission when cancelled. A cancelled
    /// token is replaced on [`Workflow::reset`], so fetch a fresh one after.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Pick the log file for the next submission
    pub fn select_file(&mut self, candidate: CandidateFile) -> Result<&UploadableFile, WorkflowError> {
        self.require_idle("select a file")?;

        match validate_file(candidate, self.settings.max_file_bytes) {
            Ok(file) => {
                info!(file = file.name(), size = file.size(), "Log file selected");
                self.notice = None;
                Ok(self.selected.insert(file))
            }
            Err(e) => {
                warn!(error = %e, "Log file rejected");
                self.selected = None;
                Err(self.annotate(e))
            }
        }
    }

    pub fn set_constant(&mut self, field: ConstantField, value: impl Into<String>) {
        self.constants.set(field, value);
    }

    /// Upload the selected file, run the job and wait for its result
    pub async fn submit(&mut self) -> Result<JobResult, WorkflowError> {
        self.require_idle("submit")?;

        let Some(file) = self.selected.clone() else {
            warn!("Submit without a selected file");
            return Err(self.annotate(ValidationError::NoFileSelected));
        };

        let constants = parse_constants(&self.constants);
        let invalid = constants.invalid_fields();
        if !invalid.is_empty() {
            match self.settings.constants_policy {
                ConstantsPolicy::Reject => {
                    warn!(fields = ?invalid, "Submit with invalid constants");
                    return Err(self.annotate(ValidationError::InvalidConstants { fields: invalid }));
                }
                ConstantsPolicy::PassThrough => {
                    warn!(fields = ?invalid, "Forwarding non-finite constants");
                }
            }
        }

        if self.cancel.is_cancelled() {
            return Err(WorkflowError::Cancelled);
        }

        let run_id = Uuid::now_v7();
        let span = info_span!("workflow", %run_id, file = file.name());
        self.run(file, constants).instrument(span).await
    }

    async fn run(
        &mut self,
        file: UploadableFile,
        constants: ParsedConstants,
    ) -> Result<JobResult, WorkflowError> {
        self.notice = None;
        self.metrics.submission_started();

        let keys = ArtifactKeys::for_file(self.storage.bucket(), &file);

        self.transition(WorkflowState::Uploading);
        let stored = match self.storage.store(&keys.input, file.contents().clone()).await {
            Ok(stored) => stored,
            Err(e) => return Err(self.fail(e.into())),
        };
        info!(location = %stored.location, size = stored.size, "Log file staged");

        if self.cancel.is_cancelled() {
            return Err(self.fail(WorkflowError::Cancelled));
        }

        self.transition(WorkflowState::Processing);
        let request = JobRequest::new(&keys, self.settings.columns.clone(), constants);

        let timeout = self.settings.job_timeout;
        let cancel = self.cancel.clone();
        let invoker = Arc::clone(&self.invoker);

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(WorkflowError::Cancelled),
            submitted = tokio::time::timeout(timeout, invoker.submit(&request)) => match submitted {
                Ok(Ok(result)) => Ok(result),
                Ok(Err(e)) => Err(WorkflowError::from(e)),
                Err(_) => Err(WorkflowError::from(JobError::Timeout(timeout))),
            },
        };

        match outcome {
            Ok(result) => {
                self.metrics.job_completed();
                self.transition(WorkflowState::Ready(result.clone()));
                Ok(result)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Fetch both artifacts of the completed job. Failures are reported but
    /// leave the workflow in `Ready`, so the download can be retried.
    pub async fn download(&mut self) -> Result<Vec<Delivered>, WorkflowError> {
        let keys = match (&self.state, &self.selected) {
            (WorkflowState::Ready(_), Some(file)) => ArtifactKeys::for_file(self.storage.bucket(), file),
            _ => {
                return Err(WorkflowError::InvalidTransition {
                    action: "download",
                    state: self.state.name(),
                });
            }
        };

        let outcome = retrieve_artifacts(
            self.storage.as_ref(),
            self.sink.as_ref(),
            &keys,
            self.settings.link_ttl,
            self.settings.download_gap,
        )
        .await;

        match outcome {
            Ok(delivered) => {
                for _ in &delivered {
                    self.metrics.artifact_delivered();
                }
                self.notice = None;
                Ok(delivered)
            }
            Err(e) => {
                warn!(error = %e, "Artifact download failed");
                self.metrics.download_failed();
                self.notice = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Back to `Idle` with default constants, no file and no result
    pub fn reset(&mut self) -> Result<(), WorkflowError> {
        if self.state.is_busy() {
            return Err(WorkflowError::InvalidTransition {
                action: "reset",
                state: self.state.name(),
            });
        }

        self.selected = None;
        self.constants = ConstantsConfig::default();
        self.notice = None;
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }

        self.transition(WorkflowState::Idle);
        Ok(())
    }

    fn require_idle(&self, action: &'static str) -> Result<(), WorkflowError> {
        if self.state != WorkflowState::Idle {
            return Err(WorkflowError::InvalidTransition {
                action,
                state: self.state.name(),
            });
        }
        Ok(())
    }

    /// Record a validation error as the visible notice; state is unchanged
    fn annotate(&mut self, error: ValidationError) -> WorkflowError {
        self.notice = Some(error.to_string());
        error.into()
    }

    fn fail(&mut self, error: WorkflowError) -> WorkflowError {
        let message = error.to_string();
        error!(error = %message, state = %self.state, "Workflow failed");

        self.metrics.workflow_failed();
        self.notice = Some(message.clone());
        self.transition(WorkflowState::Failed(message));
        error
    }

    fn transition(&mut self, next: WorkflowState) {
        info!(from = %self.state, to = %next, "Workflow transition");
        self.state = next;
        self.status.send_replace(self.state.clone());
    }
}
