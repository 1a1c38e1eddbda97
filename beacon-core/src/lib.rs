//! Shared building blocks for split variant queries: genomic regions and
//! chunks, query predicates, inclusion policies, the error taxonomy and the
//! runtime configuration passed into every component.
pub mod config;
pub mod consts;
pub mod errors;
pub mod models;

pub use config::BeaconConfig;
pub use errors::{BeaconError, Result};
