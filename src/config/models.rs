use crate::humanize::{ByteSize, HumanDuration};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    S3,
    /// Process-local store, contents lost on exit
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,
    /// Shared by the uploaded log file and both artifacts
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, R2, ...)
    pub endpoint: Option<String>,
    /// S3 access key (loaded from environment, not from config file)
    #[serde(skip)]
    pub access_key: Option<String>,
    /// S3 secret key (loaded from environment, not from config file)
    #[serde(skip)]
    pub secret_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            bucket: default_bucket(),
            region: default_region(),
            endpoint: None,
            access_key: None,
            secret_key: None,
        }
    }
}

fn default_bucket() -> String {
    "physicscalc".to_string()
}

fn default_region() -> String {
    "ap-south-1".to_string()
}

/// Remote processing endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessingConfig {
    #[serde(default = "default_processing_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    /// Upper bound for one remote job; hitting it fails the workflow
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_processing_endpoint(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_processing_endpoint() -> String {
    "http://localhost:8000/api/v1/mloutput".to_string()
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(300)
}

fn default_user_agent() -> String {
    concat!("petrocalc/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Log column mnemonics sent with every job.
///
/// These describe the curve names inside the uploaded file and are fixed per
/// deployment, not chosen per submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub bulk_density: String,
    pub neutron_porosity: String,
    pub deep_resistivity: String,
    pub porosity: String,
    pub water_saturation: String,
    pub density_log_porosity: String,
    pub permeability: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            bulk_density: "RHOB".to_string(),
            neutron_porosity: "NPHI".to_string(),
            deep_resistivity: "ILD".to_string(),
            porosity: "PHI".to_string(),
            water_saturation: "SW".to_string(),
            density_log_porosity: "DPHI".to_string(),
            permeability: "K".to_string(),
        }
    }
}

impl ColumnConfig {
    /// `(config key, value)` pairs in request order
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("bulk_density", self.bulk_density.as_str()),
            ("neutron_porosity", self.neutron_porosity.as_str()),
            ("deep_resistivity", self.deep_resistivity.as_str()),
            ("porosity", self.porosity.as_str()),
            ("water_saturation", self.water_saturation.as_str()),
            ("density_log_porosity", self.density_log_porosity.as_str()),
            ("permeability", self.permeability.as_str()),
        ]
    }
}

/// Artifact retrieval settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Lifetime of each signed link
    #[serde(default = "default_link_ttl")]
    pub link_ttl: HumanDuration,
    /// Pause between the plots and data downloads
    #[serde(default = "default_gap")]
    pub gap: HumanDuration,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Attempts per artifact fetch (1 = no retry)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: HumanDuration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            link_ttl: default_link_ttl(),
            gap: default_gap(),
            output_dir: default_output_dir(),
            max_attempts: default_max_attempts(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

fn default_link_ttl() -> HumanDuration {
    HumanDuration::from_secs(120)
}

fn default_gap() -> HumanDuration {
    HumanDuration::from_millis(1000)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_max_attempts() -> u32 {
    2
}

fn default_fetch_timeout() -> HumanDuration {
    HumanDuration::from_secs(60)
}

/// What to do with constants that do not parse to a finite number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantsPolicy {
    /// Block submission and name the offending fields
    #[default]
    Reject,
    /// Send the values anyway (non-finite numbers become JSON `null`)
    PassThrough,
}

/// Input limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: ByteSize,
    #[serde(default)]
    pub constants_policy: ConstantsPolicy,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            constants_policy: ConstantsPolicy::default(),
        }
    }
}

fn default_max_file_bytes() -> ByteSize {
    ByteSize(512 * 1024 * 1024) // 512 MB
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_filter() -> String {
    "petrocalc=info,warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.bucket, "physicscalc");
        assert_eq!(config.storage.provider, StorageProvider::S3);
        assert_eq!(config.download.link_ttl.as_duration(), Duration::from_secs(120));
        assert_eq!(config.download.gap.as_duration(), Duration::from_millis(1000));
        assert_eq!(config.limits.constants_policy, ConstantsPolicy::Reject);
        assert_eq!(config.columns.permeability, "K");
        assert_eq!(config.columns.density_log_porosity, "DPHI");
    }

    #[test]
    fn test_column_entries_keep_request_order() {
        let columns = ColumnConfig::default();
        let values: Vec<&str> = columns.entries().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!["RHOB", "NPHI", "ILD", "PHI", "SW", "DPHI", "K"]);
    }
}
