//! Remote processing job: request schema, result, and the invoker seam
//!
//! One job takes the uploaded log file from storage, runs the petrophysical
//! calculation and writes the plots and data artifacts back to storage. The
//! service is opaque; all this crate sees is one JSON request and one JSON
//! response.

mod client;
mod models;

pub use client::{HttpJobInvoker, InvokerConfig};
pub use models::{ColumnNames, JobRequest, JobResult};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Processing request failed: {0}")]
    Transport(String),

    #[error("Processing service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed processing response: {0}")]
    MalformedResponse(String),

    #[error("Processing did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Invalid processing endpoint: {0}")]
    InvalidEndpoint(String),
}

pub type Result<T> = std::result::Result<T, JobError>;

/// Submits one job and waits for its result.
///
/// Implementations perform a single attempt; retrying belongs to the caller.
#[async_trait]
pub trait JobInvoker: Send + Sync {
    async fn submit(&self, request: &JobRequest) -> Result<JobResult>;
}
