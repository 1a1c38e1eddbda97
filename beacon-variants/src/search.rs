use log::info;
use rayon::prelude::*;

use beacon_core::BeaconConfig;
use beacon_core::models::{Granularity, InclusionPolicy, Region};
use beacon_splitquery::{ChunkQuery, DatasetResult, ResolvedDataset, SplitQueryAggregator, resolve};

use crate::datasets::{DatasetDescriptor, DatasetResolver};
use crate::errors::Result;
use crate::request::VariantQuery;

/// Merged answer over every participating dataset, before formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchAnswer {
    pub exists: bool,
    /// Sum of variant counts over the datasets with a hit
    pub total_count: u64,
    pub per_dataset: Vec<ResolvedDataset>,
    pub granularity: Granularity,
    pub failed_chunks: usize,
    /// Chunks were dispatched but none answered, so a miss is not trustworthy
    pub indeterminate: bool,
}

impl SearchAnswer {
    fn from_datasets(per_dataset: Vec<ResolvedDataset>, granularity: Granularity) -> Self {
        let exists = per_dataset.iter().any(|d| d.exists());
        let total_count = per_dataset
            .iter()
            .filter(|d| d.exists())
            .fold(0u64, |total, d| total.saturating_add(d.result.variant_count));
        let failed_chunks = per_dataset.iter().map(|d| d.result.chunks_failed).sum();
        let dispatched: usize = per_dataset.iter().map(|d| d.result.chunks_total).sum();
        let succeeded: usize = per_dataset.iter().map(|d| d.result.chunks_succeeded).sum();

        SearchAnswer {
            exists,
            total_count,
            per_dataset,
            granularity,
            failed_chunks,
            indeterminate: !exists && dispatched > 0 && succeeded == 0,
        }
    }

    /// Datasets the inclusion policy lets through.
    pub fn included(&self) -> impl Iterator<Item = &ResolvedDataset> {
        self.per_dataset.iter().filter(|d| d.included)
    }
}

/// Runs one variant query against every resolved dataset.
pub struct VariantSearch<R: DatasetResolver> {
    aggregator: SplitQueryAggregator,
    resolver: R,
    default_policy: InclusionPolicy,
}

impl<R: DatasetResolver> VariantSearch<R> {
    pub fn new(aggregator: SplitQueryAggregator, resolver: R, config: &BeaconConfig) -> Self {
        VariantSearch {
            aggregator,
            resolver,
            default_policy: config.default_policy,
        }
    }

    /// Reject a query before any job state is touched, including regions
    /// that would fan out into too many chunks.
    pub fn validate(&self, query: &VariantQuery) -> Result<Region> {
        let region = query.region()?;
        self.aggregator.check_fan_out(&region)?;
        Ok(region)
    }

    ///
    /// Search every dataset concurrently and merge the per-dataset answers.
    ///
    /// An empty dataset selection is a plain miss.
    ///
    pub fn perform(&self, query: &VariantQuery) -> Result<SearchAnswer> {
        let region = self.validate(query)?;
        let policy = query.policy(self.default_policy);
        let check_all = query.check_all(policy);

        let datasets = self.resolver.resolve(
            &query.assembly_id,
            query.dataset_ids.as_deref(),
            query.limit,
        )?;
        info!(
            "Searching {} datasets on {} for {} (policy {}, check_all {})",
            datasets.len(),
            query.assembly_id,
            region,
            policy,
            check_all
        );

        let per_dataset = datasets
            .par_iter()
            .map(|dataset| {
                let merged = self.search_dataset(dataset, &region, query, check_all)?;
                Ok(resolve(merged, policy))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SearchAnswer::from_datasets(
            per_dataset,
            query.requested_granularity,
        ))
    }

    /// Fan out each data source of a dataset; stops after the first source
    /// with a hit when counts are not needed.
    fn search_dataset(
        &self,
        dataset: &DatasetDescriptor,
        region: &Region,
        query: &VariantQuery,
        check_all: bool,
    ) -> Result<DatasetResult> {
        let scope = query.scope_for(&dataset.sample_ids);
        let mut merged = DatasetResult::empty(dataset.dataset_id.as_str());

        for vcf_location in &dataset.vcf_locations {
            let chunk_query = ChunkQuery::new(query.predicate(), scope.clone(), vcf_location.clone());
            let partial =
                self.aggregator
                    .aggregate(&dataset.dataset_id, region, &chunk_query, check_all)?;
            merged.merge(partial);
            if merged.exists && !check_all {
                break;
            }
        }

        Ok(merged)
    }
}
