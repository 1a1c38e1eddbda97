pub mod query;
pub mod region;

pub use query::{Granularity, InclusionPolicy, SampleScope, VariantPredicate};
pub use region::{Chunk, Region};
