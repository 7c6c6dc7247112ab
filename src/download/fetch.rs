//! HTTP fetcher that saves artifacts to disk

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use super::{Delivered, DownloadError, DownloadSink, Result};
use crate::config::DownloadConfig;
use crate::storage::SignedUrl;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub user_agent: String,
    pub output_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_attempts: 2,
            user_agent: concat!("petrocalc/", env!("CARGO_PKG_VERSION")).to_string(),
            output_dir: PathBuf::from("downloads"),
        }
    }
}

impl From<&DownloadConfig> for FetchConfig {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            request_timeout: config.fetch_timeout.as_duration(),
            max_attempts: config.max_attempts,
            output_dir: config.output_dir.clone(),
            ..Self::default()
        }
    }
}

/// Downloads signed links into `output_dir`
pub struct FileDownloader {
    client: Client,
    config: FetchConfig,
}

impl FileDownloader {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| DownloadError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.config.output_dir
    }

    /// Fetch with bounded retries
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.fetch_once(url).await {
                Ok(bytes) => {
                    if attempts > 1 {
                        debug!(attempts, "Artifact fetch succeeded after retry");
                    }
                    return Ok(bytes);
                }
                Err(e) => {
                    if attempts >= self.config.max_attempts.max(1) {
                        warn!(attempts, error = %e, "Artifact fetch failed");
                        return Err(e);
                    }

                    warn!(attempts, error = %e, "Artifact fetch failed, retrying");

                    // Exponential backoff: 1s, 2s, 4s
                    let backoff = Duration::from_secs(2u64.pow(attempts - 1));
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Bytes> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::Timeout
            } else {
                DownloadError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| DownloadError::RequestFailed(format!("Failed to read body: {}", e)))
    }
}

#[async_trait]
impl DownloadSink for FileDownloader {
    async fn deliver(&self, link: &SignedUrl, file_name: &str) -> Result<Delivered> {
        if !is_plain_file_name(file_name) {
            return Err(DownloadError::InvalidFileName(file_name.to_string()));
        }
        if link.is_expired() {
            return Err(DownloadError::LinkExpired(link.expires_at));
        }

        let bytes = self.fetch(&link.url).await?;

        let dir = &self.config.output_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| DownloadError::Write {
                path: dir.clone(),
                source,
            })?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), size = bytes.len(), "Artifact saved");

        Ok(Delivered {
            file_name: file_name.to_string(),
            target: path.display().to_string(),
            size: bytes.len() as u64,
        })
    }
}

/// One normal path component, so the file stays inside `output_dir`
fn is_plain_file_name(file_name: &str) -> bool {
    let mut components = Path::new(file_name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
