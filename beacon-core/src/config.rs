//! Runtime configuration shared by the splitter, the aggregator and the job store.
//!
//! A [`BeaconConfig`] is built once at startup (from defaults, an optional TOML
//! file and environment overrides) and then passed by reference into every
//! component constructor.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::consts::{
    DEFAULT_JOB_STORE_SUBFOLDER, DEFAULT_MAX_CHUNKS, DEFAULT_MAX_CONCURRENCY, DEFAULT_SPLIT_SIZE,
    DEFAULT_STALE_AFTER_SECS, DEFAULT_WORKER_TIMEOUT_SECS, JOB_STORE_ENV, MAX_CHUNKS_ENV,
    MAX_CONCURRENCY_ENV, SPLIT_SIZE_ENV, STALE_AFTER_ENV, WORKER_TIMEOUT_ENV, WORKER_URL_ENV,
};
use crate::errors::{BeaconError, Result};
use crate::models::InclusionPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    /// Largest chunk span in bases
    pub split_size: u64,
    /// Chunk invocations allowed in flight per aggregation
    pub max_concurrency: usize,
    /// Regions needing more chunks than this are rejected
    pub max_chunks: u64,
    /// Endpoint of the chunk worker
    pub worker_url: Option<String>,
    pub worker_timeout_secs: u64,
    /// Folder holding persisted job records
    pub job_store_dir: PathBuf,
    /// Age after which a RUNNING claim is considered abandoned
    pub stale_after_secs: u64,
    /// Policy used when a request does not name one
    pub default_policy: InclusionPolicy,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        BeaconConfig {
            split_size: DEFAULT_SPLIT_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_chunks: DEFAULT_MAX_CHUNKS,
            worker_url: None,
            worker_timeout_secs: DEFAULT_WORKER_TIMEOUT_SECS,
            job_store_dir: get_default_job_store_dir(),
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
            default_policy: InclusionPolicy::None,
        }
    }
}

impl BeaconConfig {
    pub fn builder() -> BeaconConfigBuilder {
        BeaconConfigBuilder::default()
    }

    /// Read a TOML config file; missing keys fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: BeaconConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the `BEACON_*` environment variables on top of this config.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup, keyed by the env names
    /// in [`crate::consts`].
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(SPLIT_SIZE_ENV) {
            self.split_size = parse_var(SPLIT_SIZE_ENV, &v)?;
        }
        if let Some(v) = lookup(MAX_CONCURRENCY_ENV) {
            self.max_concurrency = parse_var(MAX_CONCURRENCY_ENV, &v)?;
        }
        if let Some(v) = lookup(MAX_CHUNKS_ENV) {
            self.max_chunks = parse_var(MAX_CHUNKS_ENV, &v)?;
        }
        if let Some(v) = lookup(WORKER_URL_ENV) {
            self.worker_url = Some(v);
        }
        if let Some(v) = lookup(WORKER_TIMEOUT_ENV) {
            self.worker_timeout_secs = parse_var(WORKER_TIMEOUT_ENV, &v)?;
        }
        if let Some(v) = lookup(JOB_STORE_ENV) {
            self.job_store_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(STALE_AFTER_ENV) {
            self.stale_after_secs = parse_var(STALE_AFTER_ENV, &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings the aggregator cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.split_size == 0 {
            return Err(BeaconError::InvalidConfiguration(
                "split_size must be positive".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(BeaconError::InvalidConfiguration(
                "max_concurrency must be positive".to_string(),
            ));
        }
        if self.max_chunks == 0 {
            return Err(BeaconError::InvalidConfiguration(
                "max_chunks must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        BeaconError::InvalidConfiguration(format!("{} has an invalid value: {}", key, value))
    })
}

/// Builder for [`BeaconConfig`], starting from the defaults.
#[derive(Default)]
pub struct BeaconConfigBuilder {
    split_size: Option<u64>,
    max_concurrency: Option<usize>,
    max_chunks: Option<u64>,
    worker_url: Option<String>,
    worker_timeout_secs: Option<u64>,
    job_store_dir: Option<PathBuf>,
    stale_after_secs: Option<u64>,
    default_policy: Option<InclusionPolicy>,
}

impl BeaconConfigBuilder {
    pub fn with_split_size(mut self, split_size: u64) -> Self {
        self.split_size = Some(split_size);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = Some(max_concurrency);
        self
    }

    pub fn with_max_chunks(mut self, max_chunks: u64) -> Self {
        self.max_chunks = Some(max_chunks);
        self
    }

    pub fn with_worker_url(mut self, url: String) -> Self {
        self.worker_url = Some(url);
        self
    }

    pub fn with_worker_timeout_secs(mut self, secs: u64) -> Self {
        self.worker_timeout_secs = Some(secs);
        self
    }

    pub fn with_job_store_dir(mut self, path: PathBuf) -> Self {
        self.job_store_dir = Some(path);
        self
    }

    pub fn with_stale_after_secs(mut self, secs: u64) -> Self {
        self.stale_after_secs = Some(secs);
        self
    }

    pub fn with_default_policy(mut self, policy: InclusionPolicy) -> Self {
        self.default_policy = Some(policy);
        self
    }

    /// Consumes the builder and validates the resulting config.
    pub fn finish(self) -> Result<BeaconConfig> {
        let defaults = BeaconConfig::default();
        let config = BeaconConfig {
            split_size: self.split_size.unwrap_or(defaults.split_size),
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
            max_chunks: self.max_chunks.unwrap_or(defaults.max_chunks),
            worker_url: self.worker_url.or(defaults.worker_url),
            worker_timeout_secs: self
                .worker_timeout_secs
                .unwrap_or(defaults.worker_timeout_secs),
            job_store_dir: self.job_store_dir.unwrap_or(defaults.job_store_dir),
            stale_after_secs: self.stale_after_secs.unwrap_or(defaults.stale_after_secs),
            default_policy: self.default_policy.unwrap_or(defaults.default_policy),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Get default job store folder, under the home folder or `/tmp` as a last resort
pub fn get_default_job_store_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    home.join(DEFAULT_JOB_STORE_SUBFOLDER)
}
