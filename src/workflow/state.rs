use std::fmt;
use thiserror::Error;

use crate::download::DownloadError;
use crate::job::{JobError, JobResult};
use crate::storage::StorageError;
use crate::validation::ValidationError;

/// Where a workflow currently is
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle,
    Uploading,
    Processing,
    Ready(JobResult),
    Failed(String),
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Uploading => "uploading",
            WorkflowState::Processing => "processing",
            WorkflowState::Ready(_) => "ready",
            WorkflowState::Failed(_) => "failed",
        }
    }

    /// Status text shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "Calculate",
            WorkflowState::Uploading => "Uploading File...",
            WorkflowState::Processing => "Processing file...",
            WorkflowState::Ready(_) => "Ready",
            WorkflowState::Failed(_) => "Failed",
        }
    }

    /// Upload and processing are in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowState::Uploading | WorkflowState::Processing)
    }

    pub fn result(&self) -> Option<&JobResult> {
        match self {
            WorkflowState::Ready(result) => Some(result),
            _ => None,
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Workflow cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_follow_state() {
        assert_eq!(WorkflowState::Idle.label(), "Calculate");
        assert_eq!(WorkflowState::Uploading.label(), "Uploading File...");
        assert_eq!(WorkflowState::Processing.label(), "Processing file...");
        assert!(WorkflowState::Processing.is_busy());
        assert!(!WorkflowState::Failed("boom".into()).is_busy());
    }

    #[test]
    fn only_ready_carries_a_result() {
        let ready = WorkflowState::Ready(JobResult::new(json!({"status": "ok"})));
        assert_eq!(ready.result().map(|r| &r.payload), Some(&json!({"status": "ok"})));
        assert!(WorkflowState::Failed("x".into()).result().is_none());
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let err = WorkflowError::from(ValidationError::NoFileSelected);
        assert_eq!(err.to_string(), "Please select a file to upload.");
    }
}
