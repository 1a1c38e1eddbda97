//! Fan-out/fan-in over the chunks of one region.
//!
//! Every chunk is handed to a bounded rayon pool at once; results flow back
//! over a single crossbeam channel and are merged in arrival order. When only
//! existence matters the consumer stops at the first hit and abandons the
//! chunks still in flight.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::unbounded;
use fxhash::FxHashSet;
use log::{debug, error, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;

use beacon_core::models::Region;
use beacon_core::{BeaconConfig, BeaconError};

use crate::errors::Result;
use crate::splitter::{chunk_count, split_region};
use crate::worker::{ChunkQuery, ChunkResult, ChunkWorker, WorkerFailure};

///
/// Merged outcome of all chunks for one dataset, before any inclusion policy
/// is applied.
///
/// Merging is commutative and associative, so neither chunk arrival order nor
/// the grouping of partial results changes the final value.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetResult {
    pub dataset_id: String,
    pub exists: bool,
    pub all_alleles_count: u64,
    pub variant_count: u64,
    pub call_count: u64,
    #[serde(skip)]
    pub samples: FxHashSet<String>,
    /// Chunks dispatched
    pub chunks_total: usize,
    /// Chunks that answered, hit or miss
    pub chunks_succeeded: usize,
    /// Chunks that answered with a [`WorkerFailure`]
    pub chunks_failed: usize,
}

impl DatasetResult {
    pub fn empty(dataset_id: impl Into<String>) -> Self {
        DatasetResult {
            dataset_id: dataset_id.into(),
            exists: false,
            all_alleles_count: 0,
            variant_count: 0,
            call_count: 0,
            samples: FxHashSet::default(),
            chunks_total: 0,
            chunks_succeeded: 0,
            chunks_failed: 0,
        }
    }

    /// Fold one chunk outcome in. Counts are only taken from hits, and only
    /// when `check_all` asks for them. Counts saturate at `u64::MAX`.
    pub fn absorb(&mut self, outcome: std::result::Result<ChunkResult, WorkerFailure>, check_all: bool) {
        match outcome {
            Ok(result) => {
                self.chunks_succeeded += 1;
                if result.exists {
                    self.exists = true;
                    if check_all {
                        self.all_alleles_count =
                            self.all_alleles_count.saturating_add(result.all_alleles_count);
                        self.variant_count = self.variant_count.saturating_add(result.variant_count);
                        self.call_count = self.call_count.saturating_add(result.call_count);
                        self.samples.extend(result.samples);
                    }
                }
            }
            Err(_) => self.chunks_failed += 1,
        }
    }

    /// Combine with a partial result for the same dataset (e.g. another data source).
    pub fn merge(&mut self, other: DatasetResult) {
        self.exists |= other.exists;
        self.all_alleles_count = self.all_alleles_count.saturating_add(other.all_alleles_count);
        self.variant_count = self.variant_count.saturating_add(other.variant_count);
        self.call_count = self.call_count.saturating_add(other.call_count);
        self.samples.extend(other.samples);
        self.chunks_total += other.chunks_total;
        self.chunks_succeeded += other.chunks_succeeded;
        self.chunks_failed += other.chunks_failed;
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Chunks whose results were never consumed because of early termination.
    pub fn chunks_abandoned(&self) -> usize {
        self.chunks_total
            .saturating_sub(self.chunks_succeeded + self.chunks_failed)
    }

    /// No hit, and not a single chunk answered: "not found" cannot be claimed.
    pub fn is_indeterminate(&self) -> bool {
        !self.exists && self.chunks_total > 0 && self.chunks_succeeded == 0
    }
}

///
/// Dispatches chunk queries on a bounded pool and merges their results.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use beacon_core::BeaconConfig;
/// use beacon_core::models::{Region, SampleScope, VariantPredicate};
/// use beacon_splitquery::{ChunkQuery, ChunkRequest, ChunkResult, SplitQueryAggregator, WorkerFailure};
///
/// let worker = |_: &ChunkRequest| -> Result<ChunkResult, WorkerFailure> { Ok(ChunkResult::miss()) };
/// let config = BeaconConfig::builder().with_split_size(100).finish().unwrap();
/// let aggregator = SplitQueryAggregator::new(Arc::new(worker), &config).unwrap();
///
/// let query = ChunkQuery::new(VariantPredicate::default(), SampleScope::all_samples(), "local.vcf.gz".into());
/// let region = Region::new("1", 1, 1_000).unwrap();
/// let result = aggregator.aggregate("ds1", &region, &query, true).unwrap();
/// assert!(!result.exists);
/// assert_eq!(result.chunks_total, 10);
/// ```
pub struct SplitQueryAggregator {
    worker: Arc<dyn ChunkWorker>,
    pool: Arc<ThreadPool>,
    split_size: u64,
    max_chunks: u64,
}

impl SplitQueryAggregator {
    pub fn new(worker: Arc<dyn ChunkWorker>, config: &BeaconConfig) -> Result<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.max_concurrency)
            .thread_name(|i| format!("beacon-chunk-{}", i))
            .panic_handler(|_| error!("chunk worker thread panicked"))
            .build()?;

        Ok(SplitQueryAggregator {
            worker,
            pool: Arc::new(pool),
            split_size: config.split_size,
            max_chunks: config.max_chunks,
        })
    }

    pub fn split_size(&self) -> u64 {
        self.split_size
    }

    /// Reject regions that would split into more than `max_chunks` chunks.
    pub fn check_fan_out(&self, region: &Region) -> Result<u64> {
        let count = chunk_count(region, self.split_size);
        if count > self.max_chunks {
            return Err(BeaconError::InvalidConfiguration(format!(
                "region {} needs {} chunks of {} bases, more than the limit of {}",
                region, count, self.split_size, self.max_chunks
            ))
            .into());
        }
        Ok(count)
    }

    ///
    /// Query every chunk of `region` and merge the answers.
    ///
    /// # Arguments
    /// - dataset_id: label of the returned result
    /// - region: region to split and scan
    /// - query: predicate, sample scope and data source shared by all chunks
    /// - check_all: accumulate counts from every chunk; when false, return at the first hit
    ///
    /// # Returns
    /// - the merged result; chunk failures are counted in it, never returned as errors
    /// - an error when the region exceeds the chunk limit
    pub fn aggregate(
        &self,
        dataset_id: &str,
        region: &Region,
        query: &ChunkQuery,
        check_all: bool,
    ) -> Result<DatasetResult> {
        self.check_fan_out(region)?;
        let chunks = split_region(region, self.split_size)?;
        let num_chunks = chunks.len();
        info!(
            "Splitting {} for dataset '{}' into {} chunks",
            region, dataset_id, num_chunks
        );

        let (sender, receiver) = unbounded();
        // set once the consumer stops listening; queued chunks skip their call
        let abandoned = Arc::new(AtomicBool::new(false));

        for chunk in &chunks {
            let sender = sender.clone();
            let worker = Arc::clone(&self.worker);
            let abandoned = Arc::clone(&abandoned);
            let request = query.request_for(chunk, check_all);

            self.pool.spawn(move || {
                if abandoned.load(Ordering::Acquire) {
                    return;
                }
                let outcome = catch_unwind(AssertUnwindSafe(|| worker.execute(&request)))
                    .unwrap_or(Err(WorkerFailure::Panicked));
                // the receiver is gone after early termination
                let _ = sender.send((request.region, outcome));
            });
        }
        drop(sender);

        let mut result = DatasetResult::empty(dataset_id);
        result.chunks_total = num_chunks;
        let mut processed = 0;
        while processed < num_chunks && (check_all || !result.exists) {
            let Ok((chunk_region, outcome)) = receiver.recv() else {
                // every sender dropped without reporting
                warn!(
                    "dataset '{}': {} chunks never reported",
                    dataset_id,
                    num_chunks - processed
                );
                for _ in processed..num_chunks {
                    result.absorb(Err(WorkerFailure::Disconnected), check_all);
                }
                break;
            };
            processed += 1;
            if let Err(failure) = &outcome {
                warn!(
                    "dataset '{}', region '{}': chunk failed: {}",
                    dataset_id, chunk_region, failure
                );
            }
            result.absorb(outcome, check_all);
        }

        if processed < num_chunks && result.exists {
            abandoned.store(true, Ordering::Release);
            debug!(
                "dataset '{}': hit found after {}/{} chunks, abandoning the rest",
                dataset_id, processed, num_chunks
            );
        }
        if result.chunks_failed > 0 {
            warn!(
                "dataset '{}': {}/{} chunks failed",
                dataset_id, result.chunks_failed, num_chunks
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn outcomes() -> Vec<std::result::Result<ChunkResult, WorkerFailure>> {
        vec![
            Ok(ChunkResult::miss()),
            Ok(ChunkResult::hit(8, 2, 4).with_samples(["s1", "s2"])),
            Err(WorkerFailure::Status(502)),
            Ok(ChunkResult::hit(6, 1, 1).with_samples(["s2", "s3"])),
            Ok(ChunkResult::miss()),
            Err(WorkerFailure::Transport("reset".to_string())),
            Ok(ChunkResult::hit(2, 1, 2).with_samples(["s4"])),
        ]
    }

    fn fold(
        items: Vec<std::result::Result<ChunkResult, WorkerFailure>>,
        check_all: bool,
    ) -> DatasetResult {
        let mut result = DatasetResult::empty("ds");
        result.chunks_total = items.len();
        for item in items {
            result.absorb(item, check_all);
        }
        result
    }

    #[test]
    fn test_absorb_accumulates_hits_only() {
        let result = fold(outcomes(), true);
        assert!(result.exists);
        assert_eq!(result.all_alleles_count, 16);
        assert_eq!(result.variant_count, 4);
        assert_eq!(result.call_count, 7);
        assert_eq!(result.sample_count(), 4);
        assert_eq!(result.chunks_succeeded, 5);
        assert_eq!(result.chunks_failed, 2);
        assert_eq!(result.chunks_abandoned(), 0);
    }

    #[test]
    fn test_absorb_without_check_all_keeps_only_existence() {
        let result = fold(outcomes(), false);
        assert!(result.exists);
        assert_eq!(result.call_count, 0);
        assert_eq!(result.all_alleles_count, 0);
        assert_eq!(result.sample_count(), 0);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let expected = fold(outcomes(), true);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut shuffled = outcomes();
            shuffled.shuffle(&mut rng);
            assert_eq!(fold(shuffled, true), expected);
        }
    }

    #[test]
    fn test_merge_of_partials_matches_single_fold() {
        let expected = fold(outcomes(), true);

        let mut items = outcomes();
        let tail = items.split_off(3);
        let mut left = fold(items, true);
        let right = fold(tail, true);
        left.merge(right.clone());
        assert_eq!(left, expected);

        let mut flipped = right;
        flipped.merge(fold(outcomes().into_iter().take(3).collect(), true));
        assert_eq!(flipped, expected);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let result = fold(
            vec![
                Ok(ChunkResult::hit(u64::MAX, 1, 1)),
                Ok(ChunkResult::hit(u64::MAX, u64::MAX, 1)),
                Ok(ChunkResult::hit(3, 1, 1)),
            ],
            true,
        );
        assert_eq!(result.all_alleles_count, u64::MAX);
        assert_eq!(result.variant_count, u64::MAX);
        assert_eq!(result.call_count, 3);

        let mut merged = result.clone();
        merged.merge(result);
        assert_eq!(merged.all_alleles_count, u64::MAX);
        assert_eq!(merged.chunks_succeeded, 6);
    }

    #[test]
    fn test_indeterminate_only_without_any_success() {
        let all_failed = fold(
            vec![
                Err(WorkerFailure::Panicked),
                Err(WorkerFailure::Status(500)),
            ],
            true,
        );
        assert!(all_failed.is_indeterminate());

        let partial = fold(
            vec![Err(WorkerFailure::Panicked), Ok(ChunkResult::miss())],
            true,
        );
        assert!(!partial.is_indeterminate());
        assert_eq!(partial.chunks_failed, 1);

        assert!(!DatasetResult::empty("ds").is_indeterminate());
    }
}
