//! Delivering computed artifacts to the user
//!
//! A [`DownloadSink`] receives one signed link at a time and is responsible
//! for getting the bytes to the user; [`FileDownloader`] fetches the link and
//! writes the file into a local directory.

mod fetch;

pub use fetch::{FileDownloader, FetchConfig};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::storage::{SignedUrl, StorageError};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Could not issue download link: {0}")]
    Signing(#[from] StorageError),

    #[error("Download link expired at {0}")]
    LinkExpired(chrono::DateTime<chrono::Utc>),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Refusing to save artifact as '{0}': not a plain file name")]
    InvalidFileName(String),

    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DownloadError>;

/// One artifact handed to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub file_name: String,
    /// Where the artifact ended up (a local path, or the link itself)
    pub target: String,
    pub size: u64,
}

/// Receives signed links and triggers the actual download
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn deliver(&self, link: &SignedUrl, file_name: &str) -> Result<Delivered>;
}
