//! Variant existence queries over many datasets.
//!
//! A [`route::QueryRouter`] receives a query under a query id, asks the job
//! manager whether it must run, resolves the participating datasets, fans
//! each dataset out through the split-query aggregator, applies the inclusion
//! policy and caches the projected answer on the job.
pub mod datasets;
pub mod errors;
pub mod request;
pub mod responses;
pub mod route;
pub mod search;

pub use datasets::{DatasetCatalog, DatasetDescriptor, DatasetResolver};
pub use errors::{Result, VariantsError};
pub use request::VariantQuery;
pub use route::{QueryRouter, RouteResponse};
pub use search::{SearchAnswer, VariantSearch};
