use super::models::{Config, StorageProvider};
use std::time::Duration;
use thiserror::Error;

/// S3 presigned URLs cannot outlive seven days
const MAX_LINK_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Storage provider is S3 but missing credentials (access_key or secret_key)")]
    MissingS3Credentials,

    #[error("Storage bucket must not be empty")]
    EmptyBucket,

    #[error("Invalid processing endpoint '{endpoint}': {reason}")]
    InvalidProcessingEndpoint { endpoint: String, reason: String },

    #[error("Duration must be positive: {field}")]
    ZeroDuration { field: &'static str },

    #[error("download.link_ttl ({actual:?}) exceeds limit of {limit:?}")]
    LinkTtlTooLong { actual: Duration, limit: Duration },

    #[error("Column name for '{column}' must not be empty")]
    EmptyColumnName { column: &'static str },

    #[error("download.max_attempts must be at least 1")]
    ZeroDownloadAttempts,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_storage(config)?;
    validate_processing(config)?;
    validate_columns(config)?;
    validate_download(config)?;
    Ok(())
}

fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    if config.storage.bucket.trim().is_empty() {
        return Err(ValidationError::EmptyBucket);
    }

    if config.storage.provider == StorageProvider::S3
        && (config.storage.access_key.is_none() || config.storage.secret_key.is_none())
    {
        return Err(ValidationError::MissingS3Credentials);
    }

    Ok(())
}

fn validate_processing(config: &Config) -> Result<(), ValidationError> {
    let endpoint = &config.processing.endpoint;
    let url = reqwest::Url::parse(endpoint).map_err(|e| {
        ValidationError::InvalidProcessingEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        }
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidProcessingEndpoint {
            endpoint: endpoint.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if config.processing.connect_timeout.as_duration().is_zero() {
        return Err(ValidationError::ZeroDuration {
            field: "processing.connect_timeout",
        });
    }

    if config.processing.request_timeout.as_duration().is_zero() {
        return Err(ValidationError::ZeroDuration {
            field: "processing.request_timeout",
        });
    }

    Ok(())
}

fn validate_columns(config: &Config) -> Result<(), ValidationError> {
    for (column, name) in config.columns.entries() {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyColumnName { column });
        }
    }
    Ok(())
}

fn validate_download(config: &Config) -> Result<(), ValidationError> {
    let ttl = config.download.link_ttl.as_duration();
    if ttl.is_zero() {
        return Err(ValidationError::ZeroDuration {
            field: "download.link_ttl",
        });
    }
    if ttl > MAX_LINK_TTL {
        return Err(ValidationError::LinkTtlTooLong {
            actual: ttl,
            limit: MAX_LINK_TTL,
        });
    }

    if config.download.fetch_timeout.as_duration().is_zero() {
        return Err(ValidationError::ZeroDuration {
            field: "download.fetch_timeout",
        });
    }

    if config.download.max_attempts == 0 {
        return Err(ValidationError::ZeroDownloadAttempts);
    }

    Ok(())
}
