//! Tracing setup and workflow counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Metrics handle for recording workflow counters
#[derive(Debug, Default)]
pub struct Metrics {
    submissions: AtomicU64,
    jobs_completed: AtomicU64,
    workflows_failed: AtomicU64,
    artifacts_delivered: AtomicU64,
    downloads_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submission_started(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "submissions", "Metric incremented");
    }

    pub fn job_completed(&self) {
        self.jobs_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_completed", "Metric incremented");
    }

    pub fn workflow_failed(&self) {
        self.workflows_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "workflows_failed", "Metric incremented");
    }

    pub fn artifact_delivered(&self) {
        self.artifacts_delivered.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "artifacts_delivered", "Metric incremented");
    }

    pub fn download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submissions: self.submissions.load(Ordering::Relaxed),
            jobs_completed: self.jobs_completed.load(Ordering::Relaxed),
            workflows_failed: self.workflows_failed.load(Ordering::Relaxed),
            artifacts_delivered: self.artifacts_delivered.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub submissions: u64,
    pub jobs_completed: u64,
    pub workflows_failed: u64,
    pub artifacts_delivered: u64,
    pub downloads_failed: u64,
}
