//! Split a genomic region into bounded chunks, query every chunk on an
//! independent worker, and fold the partial answers into one result per
//! dataset.
//!
//! The pieces, leaves first:
//! - [`splitter`]: turns a region into contiguous chunks no wider than the split size
//! - [`worker`]: the chunk request/response types and the [`worker::ChunkWorker`] boundary
//! - [`http`]: a [`worker::ChunkWorker`] that POSTs chunk requests to a remote endpoint
//! - [`aggregator`]: dispatches all chunks on a bounded pool and merges results as they arrive
//! - [`policy`]: decides which merged dataset results are reported in detail
pub mod aggregator;
pub mod errors;
#[cfg(feature = "http")]
pub mod http;
pub mod policy;
pub mod splitter;
pub mod worker;

pub use aggregator::{DatasetResult, SplitQueryAggregator};
pub use errors::{Result, SplitQueryError};
pub use policy::{DatasetResponse, ResolvedDataset, resolve};
pub use splitter::{chunk_count, split_region};
pub use worker::{ChunkQuery, ChunkRequest, ChunkResult, ChunkWorker, WorkerFailure};
