//! HTTP client for the processing endpoint

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{JobError, JobInvoker, JobRequest, JobResult, Result};
use crate::config::ProcessingConfig;

/// Longest slice of an error body kept in [`JobError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct InvokerConfig {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl From<&ProcessingConfig> for InvokerConfig {
    fn from(config: &ProcessingConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            connect_timeout: config.connect_timeout.as_duration(),
            request_timeout: config.request_timeout.as_duration(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Posts a [`JobRequest`] as JSON and waits for the response
pub struct HttpJobInvoker {
    client: Client,
    endpoint: reqwest::Url,
    request_timeout: Duration,
}

impl HttpJobInvoker {
    pub fn new(config: InvokerConfig) -> Result<Self> {
        let endpoint = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| JobError::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| JobError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            request_timeout: config.request_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl JobInvoker for HttpJobInvoker {
    async fn submit(&self, request: &JobRequest) -> Result<JobResult> {
        debug!(endpoint = %self.endpoint, input_key = %request.input_key, "Submitting job");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JobError::Timeout(self.request_timeout)
                } else {
                    JobError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                JobError::Timeout(self.request_timeout)
            } else {
                JobError::Transport(format!("Failed to read body: {}", e))
            }
        })?;

        if !status.is_success() {
            let mut text = String::from_utf8_lossy(&body).into_owned();
            if text.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| text.is_char_boundary(*i))
                    .unwrap_or(0);
                text.truncate(cut);
            }

            warn!(status = status.as_u16(), "Processing service rejected job");
            return Err(JobError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if body.is_empty() {
            return Err(JobError::MalformedResponse("empty response body".to_string()));
        }

        let payload: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| JobError::MalformedResponse(e.to_string()))?;

        debug!(size = body.len(), "Job completed");

        Ok(JobResult::new(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoker_config_from_processing_defaults() {
        let config = InvokerConfig::from(&ProcessingConfig::default());
        assert_eq!(config.endpoint, "http://localhost:8000/api/v1/mloutput");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert!(config.user_agent.starts_with("petrocalc/"));
    }

    #[test]
    fn rejects_unparseable_endpoint() {
        let mut config = InvokerConfig::from(&ProcessingConfig::default());
        config.endpoint = "not a url".to_string();

        assert!(matches!(
            HttpJobInvoker::new(config),
            Err(JobError::InvalidEndpoint(_))
        ));
    }
}
