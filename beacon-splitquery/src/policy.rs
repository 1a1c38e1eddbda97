//! Inclusion policy: which datasets are reported in detail, and what the
//! outward projection of a dataset looks like.

use serde::Serialize;
use serde_json::{Value, json};

use beacon_core::models::InclusionPolicy;

use crate::aggregator::DatasetResult;

/// A merged dataset result with its inclusion decided.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDataset {
    pub result: DatasetResult,
    pub included: bool,
}

/// Decide inclusion: ALL always, HIT on a hit, MISS on a miss, NONE never.
pub fn resolve(result: DatasetResult, policy: InclusionPolicy) -> ResolvedDataset {
    let included = policy.includes(result.exists);
    ResolvedDataset { result, included }
}

impl ResolvedDataset {
    pub fn exists(&self) -> bool {
        self.result.exists
    }

    /// `call_count / all_alleles_count`, undefined when no alleles were counted.
    pub fn frequency(&self) -> Option<f64> {
        if self.result.all_alleles_count > 0 {
            Some(self.result.call_count as f64 / self.result.all_alleles_count as f64)
        } else {
            None
        }
    }

    /// Outward projection. Excluded datasets expose nothing but `exists`,
    /// whatever was computed for them.
    pub fn to_response(&self) -> DatasetResponse {
        if !self.included {
            return DatasetResponse::Excluded(ExcludedDataset {
                include: false,
                exists: self.result.exists,
            });
        }

        let info = (self.result.chunks_failed > 0 || self.result.is_indeterminate()).then(|| {
            json!({
                "failedChunks": self.result.chunks_failed,
                "indeterminate": self.result.is_indeterminate(),
            })
        });

        DatasetResponse::Included(IncludedDataset {
            include: true,
            dataset_id: self.result.dataset_id.clone(),
            exists: self.result.exists,
            frequency: self.frequency(),
            variant_count: self.result.variant_count,
            call_count: self.result.call_count,
            sample_count: self.result.sample_count(),
            note: None,
            external_url: None,
            info,
            error: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DatasetResponse {
    Included(IncludedDataset),
    Excluded(ExcludedDataset),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludedDataset {
    pub include: bool,
    pub dataset_id: String,
    pub exists: bool,
    pub frequency: Option<f64>,
    pub variant_count: u64,
    pub call_count: u64,
    pub sample_count: usize,
    pub note: Option<String>,
    pub external_url: Option<String>,
    pub info: Option<Value>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedDataset {
    pub include: bool,
    pub exists: bool,
}
