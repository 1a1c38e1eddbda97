//! Remote chunk worker reached over HTTP.

use std::time::Duration;

use log::{debug, info};
use ureq::Agent;

use beacon_core::BeaconConfig;

use crate::errors::{Result, SplitQueryError};
use crate::worker::{ChunkRequest, ChunkResult, ChunkWorker, WorkerFailure, parse_worker_payload};

/// POSTs each [`ChunkRequest`] as JSON to a fixed endpoint and interprets the
/// reply with [`parse_worker_payload`].
///
/// # Examples
///
/// ```rust,no_run
/// use beacon_splitquery::http::HttpChunkWorker;
/// use std::time::Duration;
///
/// let worker = HttpChunkWorker::new("http://localhost:9000/perform-query", Duration::from_secs(30));
/// ```
pub struct HttpChunkWorker {
    agent: Agent,
    url: String,
}

impl HttpChunkWorker {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        HttpChunkWorker {
            agent: Agent::new_with_config(config),
            url: url.into(),
        }
    }

    /// Build from `worker_url` and `worker_timeout_secs`; fails when no URL is configured.
    pub fn from_config(config: &BeaconConfig) -> Result<Self> {
        let url = config.worker_url.clone().ok_or_else(|| {
            SplitQueryError::WorkerSetup("no worker_url configured".to_string())
        })?;
        Ok(HttpChunkWorker::new(
            url,
            Duration::from_secs(config.worker_timeout_secs),
        ))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ChunkWorker for HttpChunkWorker {
    fn execute(&self, request: &ChunkRequest) -> std::result::Result<ChunkResult, WorkerFailure> {
        let payload = serde_json::to_string(request)
            .map_err(|e| WorkerFailure::Malformed(e.to_string()))?;
        info!("Invoking {} with payload: {}", self.url, payload);

        let mut response = match self
            .agent
            .post(&self.url)
            .header("Content-Type", "application/json")
            .send(payload)
        {
            Ok(resp) => resp,
            Err(ureq::Error::StatusCode(code)) => return Err(WorkerFailure::Status(code)),
            Err(e) => return Err(WorkerFailure::Transport(e.to_string())),
        };

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| WorkerFailure::Transport(e.to_string()))?;
        debug!(
            "vcf_location='{}', region='{}': received payload: {}",
            request.vcf_location, request.region, body
        );

        parse_worker_payload(&body)
    }
}
