//! The chunk worker boundary: what is sent for one chunk, what comes back,
//! and how a reply is told apart from a failure.

use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use beacon_core::models::{Chunk, SampleScope, VariantPredicate};

/// Everything needed to query one data source, independent of the chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkQuery {
    pub predicate: VariantPredicate,
    pub scope: SampleScope,
    /// Locator of the data source the worker scans (e.g. a VCF URI)
    pub vcf_location: String,
}

impl ChunkQuery {
    pub fn new(predicate: VariantPredicate, scope: SampleScope, vcf_location: String) -> Self {
        ChunkQuery {
            predicate,
            scope,
            vcf_location,
        }
    }

    /// Build the payload for one chunk.
    pub fn request_for(&self, chunk: &Chunk, include_details: bool) -> ChunkRequest {
        ChunkRequest {
            region: chunk.region.to_string(),
            predicate: self.predicate.clone(),
            include_details,
            vcf_location: self.vcf_location.clone(),
            selected_samples_only: self.scope.selected_samples_only,
            sample_names: self.scope.sample_names.clone(),
        }
    }
}

/// Payload sent to a worker for a single chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRequest {
    /// `chrom:start-end`
    pub region: String,
    #[serde(flatten)]
    pub predicate: VariantPredicate,
    /// When false the worker may skip counts and sample sets
    pub include_details: bool,
    pub vcf_location: String,
    pub selected_samples_only: bool,
    pub sample_names: Vec<String>,
}

/// Successful reply for one chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub exists: bool,
    #[serde(default)]
    pub all_alleles_count: u64,
    #[serde(default)]
    pub variant_count: u64,
    #[serde(default)]
    pub call_count: u64,
    #[serde(default)]
    pub samples: FxHashSet<String>,
}

impl ChunkResult {
    pub fn miss() -> Self {
        ChunkResult::default()
    }

    pub fn hit(all_alleles_count: u64, variant_count: u64, call_count: u64) -> Self {
        ChunkResult {
            exists: true,
            all_alleles_count,
            variant_count,
            call_count,
            samples: FxHashSet::default(),
        }
    }

    pub fn with_samples<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.samples.extend(samples.into_iter().map(Into::into));
        self
    }
}

/// A chunk that produced no usable answer. The chunk contributes no evidence
/// but the rest of the aggregation carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerFailure {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Worker answered with HTTP status {0}")]
    Status(u16),

    #[error("Malformed worker payload: {0}")]
    Malformed(String),

    #[error("Worker reported an error: {0}")]
    Reported(String),

    #[error("Worker panicked")]
    Panicked,

    #[error("Chunk task ended without reporting")]
    Disconnected,
}

/// Runs the variant scan for one chunk.
///
/// Implementations are stateless per call and must be shareable across the
/// aggregator's pool threads.
pub trait ChunkWorker: Send + Sync {
    fn execute(&self, request: &ChunkRequest) -> Result<ChunkResult, WorkerFailure>;
}

impl<F> ChunkWorker for F
where
    F: Fn(&ChunkRequest) -> Result<ChunkResult, WorkerFailure> + Send + Sync,
{
    fn execute(&self, request: &ChunkRequest) -> Result<ChunkResult, WorkerFailure> {
        self(request)
    }
}

///
/// Interpret a raw worker reply.
///
/// A reply without an `exists` field means the worker errored out; an
/// `errorMessage` is surfaced as [`WorkerFailure::Reported`].
///
pub fn parse_worker_payload(payload: &str) -> Result<ChunkResult, WorkerFailure> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| WorkerFailure::Malformed(e.to_string()))?;

    let Some(object) = value.as_object() else {
        return Err(WorkerFailure::Malformed(format!(
            "expected a JSON object, got {}",
            value
        )));
    };
    if let Some(message) = object.get("errorMessage") {
        return Err(WorkerFailure::Reported(
            message.as_str().map(str::to_string).unwrap_or_else(|| message.to_string()),
        ));
    }
    if !object.contains_key("exists") {
        return Err(WorkerFailure::Malformed(
            "payload has no 'exists' field".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| WorkerFailure::Malformed(e.to_string()))
}
